//! Parsing of method descriptors, to know what an invoke instruction takes from the stack and gives back.

use std::iter::Peekable;
use std::str::Chars;
use crate::error::{Error, Result};

/// A field type, as used for parameters and return values.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Type {
	/// A `byte`.
	B,
	/// A `char`.
	C,
	/// A `double`.
	D,
	/// A `float`.
	F,
	/// An `int`.
	I,
	/// A `long`.
	J,
	/// A `short`.
	S,
	/// A `boolean`.
	Z,
	/// An instance of the class with the given internal name.
	Object(String),
	/// An array type, represented by the dimension and the component type.
	Array(u8, Box<Type>),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MethodDescriptor {
	pub parameters: Vec<Type>,
	/// `None` for `void`.
	pub return_type: Option<Type>,
}

// The grammar for descriptors is:
//   MethodDescriptor:
//     "(" FieldType* ")" ReturnDescriptor
//
//   ReturnDescriptor:
//     FieldType | "V"
//
//   FieldType:
//     "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" |
//     "L" ClassName ";" |
//     "[" FieldType
fn read_field_type(chars: &mut Peekable<Chars>) -> Option<Type> {
	let mut array_dimension: u8 = 0;
	while chars.next_if_eq(&'[').is_some() {
		array_dimension = array_dimension.checked_add(1)?;
	}

	let component = match chars.next()? {
		'B' => Type::B,
		'C' => Type::C,
		'D' => Type::D,
		'F' => Type::F,
		'I' => Type::I,
		'J' => Type::J,
		'S' => Type::S,
		'Z' => Type::Z,
		'L' => {
			let mut class_name = String::new();
			loop {
				match chars.next()? {
					';' => break,
					char => class_name.push(char),
				}
			}
			if class_name.is_empty() {
				return None;
			}
			Type::Object(class_name)
		},
		_ => return None,
	};

	if array_dimension == 0 {
		Some(component)
	} else {
		Some(Type::Array(array_dimension, Box::new(component)))
	}
}

impl MethodDescriptor {
	pub fn parse(descriptor: &str) -> Result<MethodDescriptor> {
		MethodDescriptor::try_parse(descriptor)
			.ok_or_else(|| Error::InvalidDescriptor { descriptor: descriptor.to_owned() })
	}

	fn try_parse(descriptor: &str) -> Option<MethodDescriptor> {
		let mut chars = descriptor.chars().peekable();

		chars.next_if_eq(&'(')?;

		let mut parameters = Vec::new();
		while chars.next_if_eq(&')').is_none() {
			parameters.push(read_field_type(&mut chars)?);
		}

		let return_type = if chars.next_if_eq(&'V').is_some() {
			None
		} else {
			Some(read_field_type(&mut chars)?)
		};

		if chars.peek().is_some() {
			return None;
		}

		Some(MethodDescriptor { parameters, return_type })
	}

	pub fn is_void(&self) -> bool {
		self.return_type.is_none()
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::descriptor::{MethodDescriptor, Type};
	use crate::error::Error;

	#[test]
	fn println_descriptors() -> anyhow::Result<()> {
		assert_eq!(MethodDescriptor::parse("(Ljava/lang/String;)V")?, MethodDescriptor {
			parameters: vec![Type::Object("java/lang/String".to_owned())],
			return_type: None,
		});
		assert_eq!(MethodDescriptor::parse("(I)V")?, MethodDescriptor {
			parameters: vec![Type::I],
			return_type: None,
		});
		Ok(())
	}

	#[test]
	fn arrays_and_returns() -> anyhow::Result<()> {
		let descriptor = MethodDescriptor::parse("([[DJLjava/lang/Object;)[I")?;
		assert_eq!(descriptor.parameters, vec![
			Type::Array(2, Box::new(Type::D)),
			Type::J,
			Type::Object("java/lang/Object".to_owned()),
		]);
		assert_eq!(descriptor.return_type, Some(Type::Array(1, Box::new(Type::I))));
		assert!(!descriptor.is_void());

		assert!(MethodDescriptor::parse("()V")?.is_void());
		Ok(())
	}

	#[test]
	fn invalid() {
		for descriptor in ["", "V", "(", "()", "(I", "(X)V", "()VV", "(L;)V", "(Ljava/lang/String)V", "()[V"] {
			assert!(
				matches!(MethodDescriptor::parse(descriptor), Err(Error::InvalidDescriptor { .. })),
				"{descriptor:?} is an invalid method descriptor"
			);
		}
	}
}
