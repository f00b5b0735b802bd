//! Turning a [`ClassFile`] back into bytes.

use crate::{AttributeInfo, ClassFile, MethodInfo};

/// Big-endian output buffer, the counterpart of [`ClassReader`](crate::reader::ClassReader).
#[derive(Debug, Default)]
pub(crate) struct ClassWriter {
	buf: Vec<u8>,
}

impl ClassWriter {
	pub(crate) fn put_u8(&mut self, value: u8) {
		self.buf.push(value);
	}
	pub(crate) fn put_u16(&mut self, value: u16) {
		self.buf.extend_from_slice(&value.to_be_bytes());
	}
	pub(crate) fn put_u32(&mut self, value: u32) {
		self.buf.extend_from_slice(&value.to_be_bytes());
	}
	pub(crate) fn put_slice(&mut self, slice: &[u8]) {
		self.buf.extend_from_slice(slice);
	}

	/// Writes a count or length item of two bytes.
	pub(crate) fn put_len_u16(&mut self, len: usize) {
		debug_assert!(u16::try_from(len).is_ok(), "length {len} doesn't fit into a u16 item");
		self.put_u16(len as u16);
	}
	/// Writes a length item of four bytes.
	pub(crate) fn put_len_u32(&mut self, len: usize) {
		debug_assert!(u32::try_from(len).is_ok(), "length {len} doesn't fit into a u32 item");
		self.put_u32(len as u32);
	}

	pub(crate) fn into_inner(self) -> Vec<u8> {
		self.buf
	}
}

fn put_attributes(writer: &mut ClassWriter, attributes: &[AttributeInfo]) {
	writer.put_len_u16(attributes.len());
	for attribute in attributes {
		writer.put_u16(attribute.name_index);
		writer.put_len_u32(attribute.info.len());
		writer.put_slice(&attribute.info);
	}
}

fn put_method(writer: &mut ClassWriter, method: &MethodInfo) {
	writer.put_u16(method.access_flags);
	writer.put_u16(method.name_index);
	writer.put_u16(method.descriptor_index);
	put_attributes(writer, &method.attributes);
}

impl ClassFile {
	/// Converts the class file to its binary representation.
	///
	/// The interface and field counts are always written as zero. Counts and lengths must fit their items, this is only checked in debug builds.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut writer = ClassWriter::default();

		writer.put_u32(self.magic);
		writer.put_u16(self.minor_version);
		writer.put_u16(self.major_version);
		self.constant_pool.write(&mut writer);
		writer.put_u16(self.access_flags);
		writer.put_u16(self.this_class);
		writer.put_u16(self.super_class);
		writer.put_u16(0); // interfaces_count
		writer.put_u16(0); // fields_count
		writer.put_len_u16(self.methods.len());
		for method in &self.methods {
			put_method(&mut writer, method);
		}
		put_attributes(&mut writer, &self.attributes);

		writer.into_inner()
	}

	pub fn write(&self, writer: &mut impl std::io::Write) -> std::io::Result<()> {
		writer.write_all(&self.to_bytes())
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::writer::ClassWriter;

	#[test]
	fn lengths() {
		let mut writer = ClassWriter::default();
		writer.put_len_u16(0x1234);
		writer.put_len_u32(0x0102_0304);
		assert_eq!(writer.into_inner(), vec![0x12, 0x34, 0x01, 0x02, 0x03, 0x04]);
	}

	#[test]
	#[cfg(debug_assertions)]
	#[should_panic(expected = "doesn't fit into a u16 item")]
	fn oversized_length() {
		ClassWriter::default().put_len_u16(0x1_0000);
	}
}
