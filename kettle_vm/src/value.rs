use std::fmt::{Display, Formatter};
use java_string::JavaString;
use kettle_class::pool::{MemberRef, Resolved};

/// A value on the operand stack or in a local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
	Int(i32),
	/// A static field, pushed by `getstatic`. There is no heap, so the field itself stands in for the object it holds.
	Reference(MemberRef),
	/// A constant loaded by `ldc`.
	Constant(Resolved),
}

impl Value {
	pub fn kind(&self) -> &'static str {
		match self {
			Value::Int(_) => "int",
			Value::Reference(_) => "reference",
			Value::Constant(_) => "constant",
		}
	}

	pub fn as_int(&self) -> Option<i32> {
		match *self {
			Value::Int(value) => Some(value),
			_ => None,
		}
	}

	/// The contents of a loaded string constant, still in modified utf8.
	pub fn as_string_bytes(&self) -> Option<&[u8]> {
		match self {
			Value::Constant(resolved) => resolved.as_utf8(),
			_ => None,
		}
	}
}

impl Default for Value {
	fn default() -> Self {
		Value::Int(0)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Int(value) => write!(f, "{value}"),
			Value::Reference(member) => write!(f, "{member}"),
			Value::Constant(Resolved::Utf8(bytes)) => match JavaString::from_modified_utf8(bytes.clone()) {
				Ok(string) => write!(f, "\"{string}\""),
				Err(_) => write!(f, "{bytes:?}"),
			},
			Value::Constant(resolved) => write!(f, "{}", resolved.kind()),
		}
	}
}
