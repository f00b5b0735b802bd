//! Decoding of the string format used by `CONSTANT_Utf8_info` entries.
//!
//! Class files don't store plain UTF-8: they use "modified UTF-8", storing `\0` using two bytes and
//! supplementary characters as surrogate pairs of three bytes each.
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se22/html/jvms-4.html#jvms-4.4.7> for the complete specification of
//! the string format used in the Java Virtual Machine Specification.

use java_string::JavaString;
use crate::error::{Error, Result};

/// Decodes the contents of the `Utf8` entry at `index`, keeping unpaired surrogates.
pub fn decode(index: u16, bytes: &[u8]) -> Result<JavaString> {
	JavaString::from_modified_utf8(bytes.to_vec())
		.map_err(|_| Error::MalformedUtf8 { index })
}

/// Decodes the contents of the `Utf8` entry at `index` into a rust string.
///
/// Fails for contents a [`String`] can't hold, like unpaired surrogates.
pub fn decode_to_string(index: u16, bytes: &[u8]) -> Result<String> {
	let string = decode(index, bytes)?;
	string.as_str()
		.map(str::to_owned)
		.map_err(|_| Error::MalformedUtf8 { index })
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::error::Error;
	use crate::jstring::{decode, decode_to_string};

	#[test]
	fn ascii() -> anyhow::Result<()> {
		assert_eq!(decode_to_string(1, b"java/lang/System")?, "java/lang/System");
		assert_eq!(decode_to_string(1, b"")?, "");
		Ok(())
	}

	#[test]
	fn two_byte_zero() -> anyhow::Result<()> {
		assert_eq!(decode_to_string(1, &[b'a', 0b1100_0000, 0b1000_0000, b'b'])?, "a\0b");
		Ok(())
	}

	#[test]
	fn surrogate_pair() -> anyhow::Result<()> {
		let bytes = [0b1110_1101, 0b1010_0000, 0b1000_0000, 0b1110_1101, 0b1011_0000, 0b1000_0000];
		assert_eq!(decode_to_string(1, &bytes)?, "\u{010000}");
		Ok(())
	}

	#[test]
	fn unpaired_surrogate() {
		let bytes = [0b1110_1101, 0b1010_0000, 0b1000_0000];
		assert!(decode(4, &bytes).is_ok());
		assert!(matches!(decode_to_string(4, &bytes), Err(Error::MalformedUtf8 { index: 4 })));
	}

	#[test]
	fn invalid() {
		assert!(matches!(decode(9, &[0xff]), Err(Error::MalformedUtf8 { index: 9 })));
	}
}
