use std::fmt::{Display, Formatter};
use crate::native::NativeKey;
use crate::value::Value;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can stop the execution of a method.
///
/// None of these are recoverable: the frame that produced one can't continue.
#[derive(Debug)]
pub enum Error {
	/// Reading operands or resolving constants failed.
	Class(kettle_class::Error),
	UnimplementedOpcode {
		opcode: u8,
		offset: usize,
	},
	UnsupportedNativeCall {
		key: NativeKey,
	},
	/// A native was called with an argument it can't handle.
	NativeArgument {
		key: NativeKey,
		found: Value,
	},
	/// A native for a method returning a value gave back nothing.
	MissingReturnValue {
		key: NativeKey,
		offset: usize,
	},
	/// The receiver of an `invokevirtual` wasn't a static field reference, so no native can be looked up for it.
	UnsupportedReceiver {
		receiver: Value,
		offset: usize,
	},
	StackUnderflow {
		opcode: u8,
		offset: usize,
	},
	StackOverflow {
		max_stack: u16,
		offset: usize,
	},
	LocalOutOfRange {
		index: usize,
		max_locals: u16,
		offset: usize,
	},
	TypeMismatch {
		expected: &'static str,
		found: Value,
		offset: usize,
	},
	BranchOutOfRange {
		offset: usize,
		target: isize,
	},
	NotImplemented {
		mnemonic: &'static str,
		offset: usize,
		method: String,
	},
	InvalidDescriptor {
		descriptor: String,
	},
	MethodNotFound {
		name: String,
	},
	MissingCode {
		name: String,
	},
	/// Writing the program output failed.
	Output(std::io::Error),
}

impl From<kettle_class::Error> for Error {
	fn from(value: kettle_class::Error) -> Self {
		Error::Class(value)
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::Class(e) => write!(f, "{e}"),
			Error::UnimplementedOpcode { opcode, offset } => write!(f, "opcode {opcode:#04x} at offset {offset} is not implemented"),
			Error::UnsupportedNativeCall { key } => write!(f, "no native method registered for {key}"),
			Error::NativeArgument { key, found } => write!(f, "native method {key} can't take {found:?} as argument"),
			Error::MissingReturnValue { key, offset } => write!(f, "native method {key} called at offset {offset} returned no value"),
			Error::UnsupportedReceiver { receiver, offset } =>
				write!(f, "invokevirtual at offset {offset} on {receiver:?}, only static fields can be receivers"),
			Error::StackUnderflow { opcode, offset } => write!(f, "operand stack underflow for opcode {opcode:#04x} at offset {offset}"),
			Error::StackOverflow { max_stack, offset } => write!(f, "operand stack exceeds max_stack {max_stack} at offset {offset}"),
			Error::LocalOutOfRange { index, max_locals, offset } =>
				write!(f, "local variable {index} at offset {offset} is out of range, max_locals is {max_locals}"),
			Error::TypeMismatch { expected, found, offset } => write!(f, "expected {expected} at offset {offset}, got {found:?}"),
			Error::BranchOutOfRange { offset, target } => write!(f, "branch at offset {offset} to {target} leaves the code"),
			Error::NotImplemented { mnemonic, offset, method } =>
				write!(f, "{mnemonic} of {method} at offset {offset} is not implemented"),
			Error::InvalidDescriptor { descriptor } => write!(f, "invalid method descriptor {descriptor:?}"),
			Error::MethodNotFound { name } => write!(f, "no method named {name:?}"),
			Error::MissingCode { name } => write!(f, "method {name:?} has no Code attribute"),
			Error::Output(e) => write!(f, "failed to write program output: {e}"),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Class(e) => Some(e),
			Error::Output(e) => Some(e),
			_ => None,
		}
	}
}
