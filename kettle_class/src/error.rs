use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The broad groups the [`Error`] variants fall into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
	/// The bytes couldn't be obtained: a missing file or a short read.
	Io,
	/// The bytes are there, but don't form a class file this crate accepts.
	Format,
	/// A constant pool index couldn't be turned into a value.
	ConstantResolution,
}

/// Everything that can go wrong while loading a class file or resolving its constants.
///
/// Every variant carries the byte offset, pool index or tag needed to find the problem in the input.
#[derive(Debug)]
pub enum Error {
	Io {
		path: PathBuf,
		source: std::io::Error,
	},
	UnexpectedEof {
		offset: usize,
		requested: usize,
		remaining: usize,
	},
	InvalidMagic {
		found: u32,
	},
	InterfaceUnsupported {
		count: u16,
	},
	FieldUnsupported {
		count: u16,
	},
	UnknownConstantTag {
		tag: u8,
		index: u16,
		offset: usize,
	},
	UnsupportedConstantTag {
		index: u16,
		tag: u8,
	},
	IndexOutOfRange {
		index: u16,
		count: u16,
	},
	ResolutionTooDeep {
		index: u16,
		limit: usize,
	},
	ConstantMismatch {
		index: u16,
		expected: &'static str,
		found: &'static str,
	},
	MalformedUtf8 {
		index: u16,
	},
}

impl Error {
	pub fn category(&self) -> ErrorCategory {
		match self {
			Error::Io { .. } |
			Error::UnexpectedEof { .. } => ErrorCategory::Io,
			Error::InvalidMagic { .. } |
			Error::InterfaceUnsupported { .. } |
			Error::FieldUnsupported { .. } |
			Error::UnknownConstantTag { .. } => ErrorCategory::Format,
			Error::UnsupportedConstantTag { .. } |
			Error::IndexOutOfRange { .. } |
			Error::ResolutionTooDeep { .. } |
			Error::ConstantMismatch { .. } |
			Error::MalformedUtf8 { .. } => ErrorCategory::ConstantResolution,
		}
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::Io { path, source } => write!(f, "failed to read {path:?}: {source}"),
			Error::UnexpectedEof { offset, requested, remaining } =>
				write!(f, "unexpected end of data at offset {offset}: wanted {requested} bytes, only {remaining} left"),
			Error::InvalidMagic { found } => write!(f, "wrong magic: got {found:#x}, expected 0xCAFEBABE"),
			Error::InterfaceUnsupported { count } => write!(f, "class implements {count} interfaces, interfaces are not supported"),
			Error::FieldUnsupported { count } => write!(f, "class declares {count} fields, fields are not supported"),
			Error::UnknownConstantTag { tag, index, offset } =>
				write!(f, "unknown constant pool tag {tag} for entry #{index} at offset {offset}"),
			Error::UnsupportedConstantTag { index, tag } => write!(f, "constant pool entry #{index} with tag {tag} can't be resolved"),
			Error::IndexOutOfRange { index, count } =>
				write!(f, "constant pool index #{index} is out of range, valid indices are 1..{count}"),
			Error::ResolutionTooDeep { index, limit } =>
				write!(f, "resolving constant pool entry #{index} nests deeper than {limit} entries, the pool is likely cyclic"),
			Error::ConstantMismatch { index, expected, found } =>
				write!(f, "constant pool entry #{index} is `{found}`, expected `{expected}`"),
			Error::MalformedUtf8 { index } => write!(f, "constant pool entry #{index} has invalid modified utf8 contents"),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io { source, .. } => Some(source),
			_ => None,
		}
	}
}
