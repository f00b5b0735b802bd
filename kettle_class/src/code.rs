use log::trace;
use crate::{AttributeInfo, ClassFile, MethodInfo};
use crate::error::Result;
use crate::pool::ConstantPool;
use crate::reader::ClassReader;
use crate::writer::ClassWriter;

/// The header and instructions of a `Code` attribute.
///
/// This isn't stored in the [`ClassFile`], it's decoded from the raw attribute of a method each time it's asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
	pub max_stack: u16,
	pub max_locals: u16,
	pub code: Vec<u8>,
}

impl CodeAttribute {
	pub const NAME: &'static [u8] = b"Code";

	/// Decodes `max_stack`, `max_locals`, `code_length` and `code` from the contents of a `Code` attribute.
	///
	/// The exception table and the nested attributes following the code are ignored.
	pub fn decode(info: &[u8]) -> Result<CodeAttribute> {
		let mut reader = ClassReader::new(info);
		let max_stack = reader.read_u16()?;
		let max_locals = reader.read_u16()?;
		let code_length = reader.read_u32_as_usize()?;
		let code = reader.read_u8_vec(code_length)?;

		Ok(CodeAttribute { max_stack, max_locals, code })
	}

	/// Builds the raw `Code` attribute, with an empty exception table and no nested attributes.
	///
	/// `name_index` must point to a `Utf8` entry containing `Code`.
	pub fn to_attribute(&self, name_index: u16) -> AttributeInfo {
		let mut writer = ClassWriter::default();
		writer.put_u16(self.max_stack);
		writer.put_u16(self.max_locals);
		writer.put_len_u32(self.code.len());
		writer.put_slice(&self.code);
		writer.put_u16(0); // exception_table_length
		writer.put_u16(0); // attributes_count

		AttributeInfo { name_index, info: writer.into_inner() }
	}
}

impl MethodInfo {
	/// Finds and decodes the `Code` attribute of this method.
	///
	/// Gives `None` for methods without one, like `abstract` or `native` methods.
	pub fn code(&self, pool: &ConstantPool) -> Result<Option<CodeAttribute>> {
		for attribute in &self.attributes {
			if pool.resolve_utf8(attribute.name_index)? == CodeAttribute::NAME {
				let code = CodeAttribute::decode(&attribute.info)?;
				trace!("method #{} has {} bytes of code, max_stack {}, max_locals {}",
					self.name_index, code.code.len(), code.max_stack, code.max_locals);
				return Ok(Some(code));
			}
		}
		Ok(None)
	}
}

impl ClassFile {
	pub fn get_code(&self, method: &MethodInfo) -> Result<Option<CodeAttribute>> {
		method.code(&self.constant_pool)
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::{AttributeInfo, MethodInfo};
	use crate::code::CodeAttribute;
	use crate::error::Error;
	use crate::pool::{ConstantPool, CpInfo};

	fn pool() -> ConstantPool {
		ConstantPool::new(vec![
			CpInfo::Utf8 { bytes: b"Code".to_vec() },
			CpInfo::Utf8 { bytes: b"LineNumberTable".to_vec() },
			CpInfo::Class { name_index: 2 },
		])
	}

	#[test]
	fn finds_code_among_other_attributes() -> anyhow::Result<()> {
		let code = CodeAttribute { max_stack: 2, max_locals: 1, code: vec![0x04, 0x05, 0x60, 0xac] };
		let method = MethodInfo {
			access_flags: 0,
			name_index: 0,
			descriptor_index: 0,
			attributes: vec![
				AttributeInfo { name_index: 2, info: vec![0, 0] },
				code.to_attribute(1),
			],
		};

		assert_eq!(method.code(&pool())?, Some(code));
		Ok(())
	}

	#[test]
	fn no_code() -> anyhow::Result<()> {
		let method = MethodInfo { access_flags: 0, name_index: 0, descriptor_index: 0, attributes: vec![] };
		assert_eq!(method.code(&pool())?, None);
		Ok(())
	}

	#[test]
	fn header_layout() -> anyhow::Result<()> {
		let info = [0x00, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0xb1, 0x00, 0x00, 0x00, 0x00];
		let code = CodeAttribute::decode(&info)?;
		assert_eq!(code, CodeAttribute { max_stack: 3, max_locals: 2, code: vec![0xb1] });
		Ok(())
	}

	#[test]
	fn truncated_code() {
		let info = [0x00, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00, 0x05, 0xb1];
		assert!(matches!(CodeAttribute::decode(&info), Err(Error::UnexpectedEof { offset: 8, requested: 5, remaining: 1 })));
	}

	#[test]
	fn attribute_name_not_utf8() {
		let method = MethodInfo {
			access_flags: 0,
			name_index: 0,
			descriptor_index: 0,
			attributes: vec![AttributeInfo { name_index: 3, info: vec![] }],
		};
		assert!(matches!(method.code(&pool()), Err(Error::ConstantMismatch { index: 3, .. })));
	}
}
