//! The constant pool and the recursive resolution of its entries.

use std::fmt::{Display, Formatter};
use log::trace;
use crate::error::{Error, Result};
use crate::jstring;
use crate::reader::ClassReader;
use crate::writer::ClassWriter;

/// Resolution that nests deeper than this fails with [`Error::ResolutionTooDeep`].
///
/// The deepest chain a valid pool can have is three entries long (`Methodref` → `NameAndType` → `Utf8`), a chain longer than this
/// limit can only come from entries pointing back at themselves.
pub const MAX_RESOLUTION_DEPTH: usize = 8;

/// The tag bytes of the supported constant pool entries.
pub mod tag {
	pub const UTF8: u8 = 1;
	pub const CLASS: u8 = 7;
	pub const STRING: u8 = 8;
	pub const FIELDREF: u8 = 9;
	pub const METHODREF: u8 = 10;
	pub const INTERFACE_METHODREF: u8 = 11;
	pub const NAME_AND_TYPE: u8 = 12;
}

/// A single entry of the constant pool, as stored in the class file.
///
/// Only these six kinds of entries are supported, any other tag is rejected while reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CpInfo {
	Utf8 { bytes: Vec<u8> },
	Class { name_index: u16 },
	Fieldref { class_index: u16, name_and_type_index: u16 },
	Methodref { class_index: u16, name_and_type_index: u16 },
	InterfaceMethodref { class_index: u16, name_and_type_index: u16 },
	String { string_index: u16 },
	NameAndType { name_index: u16, descriptor_index: u16 },
}

impl CpInfo {
	pub fn tag(&self) -> u8 {
		match self {
			CpInfo::Utf8 { .. } => tag::UTF8,
			CpInfo::Class { .. } => tag::CLASS,
			CpInfo::Fieldref { .. } => tag::FIELDREF,
			CpInfo::Methodref { .. } => tag::METHODREF,
			CpInfo::InterfaceMethodref { .. } => tag::INTERFACE_METHODREF,
			CpInfo::String { .. } => tag::STRING,
			CpInfo::NameAndType { .. } => tag::NAME_AND_TYPE,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			CpInfo::Utf8 { .. } => "Utf8",
			CpInfo::Class { .. } => "Class",
			CpInfo::Fieldref { .. } => "Fieldref",
			CpInfo::Methodref { .. } => "Methodref",
			CpInfo::InterfaceMethodref { .. } => "InterfaceMethodref",
			CpInfo::String { .. } => "String",
			CpInfo::NameAndType { .. } => "NameAndType",
		}
	}

	fn read(reader: &mut ClassReader, index: u16) -> Result<CpInfo> {
		let offset = reader.position();
		let tag = reader.read_u8()?;
		let entry = match tag {
			tag::UTF8 => {
				let length = reader.read_u16_as_usize()?;
				CpInfo::Utf8 { bytes: reader.read_u8_vec(length)? }
			},
			tag::CLASS => CpInfo::Class { name_index: reader.read_u16()? },
			tag::STRING => CpInfo::String { string_index: reader.read_u16()? },
			tag::FIELDREF => CpInfo::Fieldref {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::METHODREF => CpInfo::Methodref {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::INTERFACE_METHODREF => CpInfo::InterfaceMethodref {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::NAME_AND_TYPE => CpInfo::NameAndType {
				name_index: reader.read_u16()?,
				descriptor_index: reader.read_u16()?,
			},
			tag => return Err(Error::UnknownConstantTag { tag, index, offset }),
		};
		Ok(entry)
	}

	fn write(&self, writer: &mut ClassWriter) {
		writer.put_u8(self.tag());
		match self {
			CpInfo::Utf8 { bytes } => {
				writer.put_len_u16(bytes.len());
				writer.put_slice(bytes);
			},
			CpInfo::Class { name_index } => writer.put_u16(*name_index),
			CpInfo::String { string_index } => writer.put_u16(*string_index),
			CpInfo::Fieldref { class_index, name_and_type_index } |
			CpInfo::Methodref { class_index, name_and_type_index } |
			CpInfo::InterfaceMethodref { class_index, name_and_type_index } => {
				writer.put_u16(*class_index);
				writer.put_u16(*name_and_type_index);
			},
			CpInfo::NameAndType { name_index, descriptor_index } => {
				writer.put_u16(*name_index);
				writer.put_u16(*descriptor_index);
			},
		}
	}
}

/// A constant pool entry with all the indices inside it replaced by what they point to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolved {
	Utf8(Vec<u8>),
	Class {
		name: Box<Resolved>,
	},
	FieldRef {
		class: Box<Resolved>,
		name_and_type: Box<Resolved>,
	},
	MethodRef {
		class: Box<Resolved>,
		name_and_type: Box<Resolved>,
	},
	NameAndType {
		name: Box<Resolved>,
		descriptor: Box<Resolved>,
	},
}

impl Resolved {
	pub fn kind(&self) -> &'static str {
		match self {
			Resolved::Utf8(_) => "Utf8",
			Resolved::Class { .. } => "Class",
			Resolved::FieldRef { .. } => "Fieldref",
			Resolved::MethodRef { .. } => "Methodref",
			Resolved::NameAndType { .. } => "NameAndType",
		}
	}

	pub fn as_utf8(&self) -> Option<&[u8]> {
		match self {
			Resolved::Utf8(bytes) => Some(bytes),
			_ => None,
		}
	}
}

/// A field or method reference flattened into its three names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
	pub class: String,
	pub name: String,
	pub descriptor: String,
}

impl Display for MemberRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}:{}", self.class, self.name, self.descriptor)
	}
}

/// The constant pool of a class file.
///
/// Indices are 1-based like in the class file: the first entry has index `1`, and index `0` is never valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantPool {
	entries: Vec<CpInfo>,
}

impl ConstantPool {
	pub fn new(entries: Vec<CpInfo>) -> ConstantPool {
		ConstantPool { entries }
	}

	/// The number of entries, this is one less than the `constant_pool_count` item of the class file.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The `constant_pool_count` item as written in the class file, saturating at [`u16::MAX`].
	pub fn count(&self) -> u16 {
		u16::try_from(self.entries.len() + 1).unwrap_or(u16::MAX)
	}

	pub fn get(&self, index: u16) -> Result<&CpInfo> {
		index.checked_sub(1)
			.and_then(|i| self.entries.get(i as usize))
			.ok_or(Error::IndexOutOfRange { index, count: self.count() })
	}

	/// Resolves the entry at `index`, following every index it contains.
	///
	/// This is a pure function of the pool, resolving the same index twice gives equal results.
	pub fn resolve(&self, index: u16) -> Result<Resolved> {
		self.resolve_nested(index, 0)
	}

	fn resolve_nested(&self, index: u16, depth: usize) -> Result<Resolved> {
		if depth > MAX_RESOLUTION_DEPTH {
			return Err(Error::ResolutionTooDeep { index, limit: MAX_RESOLUTION_DEPTH });
		}
		let depth = depth + 1;

		let resolved = match self.get(index)? {
			CpInfo::Utf8 { bytes } => Resolved::Utf8(bytes.clone()),
			&CpInfo::Class { name_index } => Resolved::Class {
				name: Box::new(self.resolve_nested(name_index, depth)?),
			},
			&CpInfo::Fieldref { class_index, name_and_type_index } => Resolved::FieldRef {
				class: Box::new(self.resolve_nested(class_index, depth)?),
				name_and_type: Box::new(self.resolve_nested(name_and_type_index, depth)?),
			},
			&CpInfo::Methodref { class_index, name_and_type_index } => Resolved::MethodRef {
				class: Box::new(self.resolve_nested(class_index, depth)?),
				name_and_type: Box::new(self.resolve_nested(name_and_type_index, depth)?),
			},
			&CpInfo::String { string_index } => self.resolve_nested(string_index, depth)?,
			&CpInfo::NameAndType { name_index, descriptor_index } => Resolved::NameAndType {
				name: Box::new(self.resolve_nested(name_index, depth)?),
				descriptor: Box::new(self.resolve_nested(descriptor_index, depth)?),
			},
			CpInfo::InterfaceMethodref { .. } => {
				return Err(Error::UnsupportedConstantTag { index, tag: tag::INTERFACE_METHODREF });
			},
		};
		Ok(resolved)
	}

	/// Gets the contents of the `Utf8` entry at `index`.
	pub fn resolve_utf8(&self, index: u16) -> Result<&[u8]> {
		match self.get(index)? {
			CpInfo::Utf8 { bytes } => Ok(bytes),
			entry => Err(Error::ConstantMismatch { index, expected: "Utf8", found: entry.kind() }),
		}
	}

	/// Gets the contents of the `Utf8` entry at `index`, decoded into a [`String`].
	pub fn resolve_string(&self, index: u16) -> Result<String> {
		jstring::decode_to_string(index, self.resolve_utf8(index)?)
	}

	/// Resolves the `Fieldref` entry at `index`.
	pub fn resolve_field_ref(&self, index: u16) -> Result<MemberRef> {
		match self.resolve(index)? {
			Resolved::FieldRef { class, name_and_type } => flatten_member(index, &class, &name_and_type),
			resolved => Err(Error::ConstantMismatch { index, expected: "Fieldref", found: resolved.kind() }),
		}
	}

	/// Resolves the `Methodref` entry at `index`.
	pub fn resolve_method_ref(&self, index: u16) -> Result<MemberRef> {
		match self.resolve(index)? {
			Resolved::MethodRef { class, name_and_type } => flatten_member(index, &class, &name_and_type),
			resolved => Err(Error::ConstantMismatch { index, expected: "Methodref", found: resolved.kind() }),
		}
	}

	/// Resolves the `Class` entry at `index` into the internal name of the class.
	pub fn resolve_class_name(&self, index: u16) -> Result<String> {
		match self.resolve(index)? {
			Resolved::Class { name } => utf8_to_string(index, &name),
			resolved => Err(Error::ConstantMismatch { index, expected: "Class", found: resolved.kind() }),
		}
	}

	pub(crate) fn read(reader: &mut ClassReader) -> Result<ConstantPool> {
		let count = reader.read_u16()?;

		let mut entries = Vec::with_capacity((count as usize).min(reader.remaining()));
		for index in 1..count {
			entries.push(CpInfo::read(reader, index)?);
		}
		trace!("read {} constant pool entries", entries.len());

		Ok(ConstantPool { entries })
	}

	pub(crate) fn write(&self, writer: &mut ClassWriter) {
		writer.put_len_u16(self.entries.len() + 1);
		for entry in &self.entries {
			entry.write(writer);
		}
	}
}

fn utf8_to_string(index: u16, resolved: &Resolved) -> Result<String> {
	let bytes = resolved.as_utf8()
		.ok_or(Error::ConstantMismatch { index, expected: "Utf8", found: resolved.kind() })?;
	jstring::decode_to_string(index, bytes)
}

fn flatten_member(index: u16, class: &Resolved, name_and_type: &Resolved) -> Result<MemberRef> {
	let Resolved::Class { name: class } = class else {
		return Err(Error::ConstantMismatch { index, expected: "Class", found: class.kind() });
	};
	let Resolved::NameAndType { name, descriptor } = name_and_type else {
		return Err(Error::ConstantMismatch { index, expected: "NameAndType", found: name_and_type.kind() });
	};
	Ok(MemberRef {
		class: utf8_to_string(index, class)?,
		name: utf8_to_string(index, name)?,
		descriptor: utf8_to_string(index, descriptor)?,
	})
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::error::Error;
	use crate::pool::{ConstantPool, CpInfo, MemberRef, Resolved};

	fn pool() -> ConstantPool {
		ConstantPool::new(vec![
			/*  1 */ CpInfo::Fieldref { class_index: 2, name_and_type_index: 4 },
			/*  2 */ CpInfo::Class { name_index: 3 },
			/*  3 */ CpInfo::Utf8 { bytes: b"java/lang/System".to_vec() },
			/*  4 */ CpInfo::NameAndType { name_index: 5, descriptor_index: 6 },
			/*  5 */ CpInfo::Utf8 { bytes: b"out".to_vec() },
			/*  6 */ CpInfo::Utf8 { bytes: b"Ljava/io/PrintStream;".to_vec() },
			/*  7 */ CpInfo::String { string_index: 8 },
			/*  8 */ CpInfo::Utf8 { bytes: b"hello".to_vec() },
			/*  9 */ CpInfo::InterfaceMethodref { class_index: 2, name_and_type_index: 4 },
			/* 10 */ CpInfo::String { string_index: 10 },
			/* 11 */ CpInfo::Class { name_index: 12 },
			/* 12 */ CpInfo::Class { name_index: 11 },
		])
	}

	#[test]
	fn resolve_field_ref() -> anyhow::Result<()> {
		let pool = pool();

		let expected = Resolved::FieldRef {
			class: Box::new(Resolved::Class {
				name: Box::new(Resolved::Utf8(b"java/lang/System".to_vec())),
			}),
			name_and_type: Box::new(Resolved::NameAndType {
				name: Box::new(Resolved::Utf8(b"out".to_vec())),
				descriptor: Box::new(Resolved::Utf8(b"Ljava/io/PrintStream;".to_vec())),
			}),
		};
		assert_eq!(pool.resolve(1)?, expected);

		let member = pool.resolve_field_ref(1)?;
		assert_eq!(member, MemberRef {
			class: "java/lang/System".to_owned(),
			name: "out".to_owned(),
			descriptor: "Ljava/io/PrintStream;".to_owned(),
		});
		assert_eq!(member.to_string(), "java/lang/System.out:Ljava/io/PrintStream;");
		Ok(())
	}

	#[test]
	fn string_resolves_to_its_contents() -> anyhow::Result<()> {
		assert_eq!(pool().resolve(7)?, Resolved::Utf8(b"hello".to_vec()));
		Ok(())
	}

	#[test]
	fn idempotent() -> anyhow::Result<()> {
		let pool = pool();
		for index in [1, 2, 3, 4, 7] {
			assert_eq!(pool.resolve(index)?, pool.resolve(index)?);
		}
		Ok(())
	}

	#[test]
	fn out_of_range() {
		let pool = pool();
		assert!(matches!(pool.resolve(0), Err(Error::IndexOutOfRange { index: 0, count: 13 })));
		assert!(matches!(pool.resolve(13), Err(Error::IndexOutOfRange { index: 13, count: 13 })));
		assert!(matches!(pool.get(0), Err(Error::IndexOutOfRange { .. })));
	}

	#[test]
	fn count_saturates() {
		let pool = ConstantPool::new(vec![CpInfo::Utf8 { bytes: vec![] }; 70_000]);
		assert_eq!(pool.count(), u16::MAX);
		assert_eq!(pool.len(), 70_000);
	}

	#[test]
	fn interface_method_ref_is_unsupported() {
		assert!(matches!(pool().resolve(9), Err(Error::UnsupportedConstantTag { index: 9, tag: 11 })));
	}

	#[test]
	fn cycles_are_rejected() {
		let pool = pool();
		assert!(matches!(pool.resolve(10), Err(Error::ResolutionTooDeep { index: 10, .. })));
		assert!(matches!(pool.resolve(11), Err(Error::ResolutionTooDeep { .. })));
	}

	#[test]
	fn wrong_kind() {
		let pool = pool();
		assert!(matches!(
			pool.resolve_method_ref(1),
			Err(Error::ConstantMismatch { index: 1, expected: "Methodref", found: "Fieldref" })
		));
		assert!(matches!(
			pool.resolve_utf8(2),
			Err(Error::ConstantMismatch { index: 2, expected: "Utf8", found: "Class" })
		));
	}

	#[test]
	fn class_name() -> anyhow::Result<()> {
		assert_eq!(pool().resolve_class_name(2)?, "java/lang/System");
		Ok(())
	}
}
