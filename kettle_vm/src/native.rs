//! Host implementations of methods the interpreter can't run itself.
//!
//! A native is looked up by the static field the call is made on, together with the name and descriptor of the called method.
//! `System.out.println("hello")` compiles to a `getstatic` of `java/lang/System.out` followed by an `invokevirtual` of
//! `println(Ljava/lang/String;)V`, so it's found under the key
//! ```text
//! java/lang/System  out  println  (Ljava/lang/String;)V
//! ```
//! New natives are added with [`NativeRegistry::register`], the interpreter itself doesn't need to change for that.

use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::io::Write;
use java_string::JavaString;
use kettle_class::pool::MemberRef;
use crate::error::{Error, Result};
use crate::value::Value;

/// Identifies a native method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeKey {
	/// The class declaring the field the method is called on.
	pub class: String,
	pub field: String,
	pub method: String,
	pub descriptor: String,
}

impl NativeKey {
	pub fn new(
		class: impl Into<String>,
		field: impl Into<String>,
		method: impl Into<String>,
		descriptor: impl Into<String>,
	) -> NativeKey {
		NativeKey {
			class: class.into(),
			field: field.into(),
			method: method.into(),
			descriptor: descriptor.into(),
		}
	}

	/// The key of calling `method` on the object held by the static field `receiver`.
	pub fn for_call(receiver: &MemberRef, method: &MemberRef) -> NativeKey {
		NativeKey {
			class: receiver.class.clone(),
			field: receiver.name.clone(),
			method: method.name.clone(),
			descriptor: method.descriptor.clone(),
		}
	}
}

impl Display for NativeKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}.{}{}", self.class, self.field, self.method, self.descriptor)
	}
}

/// The signature of a native: it gets the program output and the arguments (without the receiver), and gives back
/// the return value, if any.
pub type NativeFn = dyn Fn(&mut dyn Write, &[Value]) -> Result<Option<Value>> + Send + Sync;

pub struct NativeRegistry {
	natives: HashMap<NativeKey, Box<NativeFn>>,
}

impl NativeRegistry {
	/// A registry without any natives.
	pub fn empty() -> NativeRegistry {
		NativeRegistry { natives: HashMap::new() }
	}

	/// Registers a native under `key`, giving back the one that was registered there before.
	pub fn register<F>(&mut self, key: NativeKey, native: F) -> Option<Box<NativeFn>>
	where
		F: Fn(&mut dyn Write, &[Value]) -> Result<Option<Value>> + Send + Sync + 'static,
	{
		self.natives.insert(key, Box::new(native))
	}

	pub fn contains(&self, key: &NativeKey) -> bool {
		self.natives.contains_key(key)
	}

	pub fn invoke(&self, key: &NativeKey, out: &mut dyn Write, args: &[Value]) -> Result<Option<Value>> {
		let native = self.natives.get(key)
			.ok_or_else(|| Error::UnsupportedNativeCall { key: key.clone() })?;
		native(out, args)
	}
}

impl Debug for NativeRegistry {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_set().entries(self.natives.keys()).finish()
	}
}

fn println_key(descriptor: &str) -> NativeKey {
	NativeKey::new("java/lang/System", "out", "println", descriptor)
}

fn single_argument<'a>(key: &NativeKey, args: &'a [Value]) -> Result<&'a Value> {
	match args {
		[arg] => Ok(arg),
		// the descriptor has exactly one parameter, so this can't happen when called from the interpreter
		_ => Err(Error::InvalidDescriptor { descriptor: key.descriptor.clone() }),
	}
}

fn println_string(out: &mut dyn Write, args: &[Value]) -> Result<Option<Value>> {
	let key = println_key("(Ljava/lang/String;)V");
	let arg = single_argument(&key, args)?;

	let string = arg.as_string_bytes()
		.and_then(|bytes| JavaString::from_modified_utf8(bytes.to_vec()).ok())
		.ok_or_else(|| Error::NativeArgument { key, found: arg.clone() })?;

	writeln!(out, "{string}").map_err(Error::Output)?;
	Ok(None)
}

fn println_int(out: &mut dyn Write, args: &[Value]) -> Result<Option<Value>> {
	let key = println_key("(I)V");
	let arg = single_argument(&key, args)?;

	let int = arg.as_int()
		.ok_or_else(|| Error::NativeArgument { key, found: arg.clone() })?;

	writeln!(out, "{int}").map_err(Error::Output)?;
	Ok(None)
}

impl Default for NativeRegistry {
	/// The registry with `System.out.println` for strings and ints.
	fn default() -> Self {
		let mut registry = NativeRegistry::empty();
		registry.register(println_key("(Ljava/lang/String;)V"), println_string);
		registry.register(println_key("(I)V"), println_int);
		registry
	}
}
