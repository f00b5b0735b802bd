use log::debug;
use crate::{AttributeInfo, ClassFile, MAGIC, MethodInfo};
use crate::error::{Error, Result};
use crate::pool::ConstantPool;
use crate::reader::ClassReader;

fn read_attributes(reader: &mut ClassReader) -> Result<Vec<AttributeInfo>> {
	reader.read_vec(
		|r| r.read_u16_as_usize(),
		|r| {
			let name_index = r.read_u16()?;
			let length = r.read_u32_as_usize()?;
			Ok(AttributeInfo {
				name_index,
				info: r.read_u8_vec(length)?,
			})
		}
	)
}

fn read_method(reader: &mut ClassReader) -> Result<MethodInfo> {
	Ok(MethodInfo {
		access_flags: reader.read_u16()?,
		name_index: reader.read_u16()?,
		descriptor_index: reader.read_u16()?,
		attributes: read_attributes(reader)?,
	})
}

/// Reads a class file from the start of the reader.
///
/// The magic is checked before anything else is read. Classes with interfaces or fields are rejected.
pub(crate) fn read(reader: &mut ClassReader) -> Result<ClassFile> {
	let magic = reader.read_u32()?;
	if magic != MAGIC {
		return Err(Error::InvalidMagic { found: magic });
	}

	let minor_version = reader.read_u16()?;
	let major_version = reader.read_u16()?;

	let constant_pool = ConstantPool::read(reader)?;

	let access_flags = reader.read_u16()?;
	let this_class = reader.read_u16()?;
	let super_class = reader.read_u16()?;

	let interfaces_count = reader.read_u16()?;
	if interfaces_count > 0 {
		return Err(Error::InterfaceUnsupported { count: interfaces_count });
	}
	let fields_count = reader.read_u16()?;
	if fields_count > 0 {
		return Err(Error::FieldUnsupported { count: fields_count });
	}

	let methods = reader.read_vec(|r| r.read_u16_as_usize(), read_method)?;
	let attributes = read_attributes(reader)?;

	debug!("read class file version {major_version}.{minor_version} with {} constant pool entries and {} methods",
		constant_pool.len(), methods.len());

	Ok(ClassFile {
		magic,
		minor_version,
		major_version,
		constant_pool,
		access_flags,
		this_class,
		super_class,
		methods,
		attributes,
	})
}
