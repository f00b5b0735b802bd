//! This crate reads the binary representation of a java class file, and resolves the constants inside it.
//!
//! Use the [Java Virtual Machine Specification, Chapter 4](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html)
//! for the layout. Only a small part of the format is accepted: classes without interfaces and fields, and constant pools made
//! of `Utf8`, `Class`, `String`, `Fieldref`, `Methodref`, `InterfaceMethodref` and `NameAndType` entries.
//!
//! This builds the class
//! ```java,ignore
//! public class Main {
//!     static int two() {
//!         return 2;
//!     }
//! }
//! ```
//! (without the constructor), writes it with [ClassFile::to_bytes] and reads it back with [ClassFile::parse].
//! ```
//! # use pretty_assertions::assert_eq;
//! use kettle_class::{ClassFile, CodeAttribute, flags, insn, MAGIC, MethodInfo};
//! use kettle_class::pool::{ConstantPool, CpInfo};
//! let class = ClassFile {
//!     magic: MAGIC,
//!     minor_version: 0,
//!     major_version: 52,
//!     constant_pool: ConstantPool::new(vec![
//!         // the constant pool indices start at 1, not at 0
//!         CpInfo::Class { name_index: 2 },
//!         CpInfo::Utf8 { bytes: b"Main".to_vec() },
//!         CpInfo::Class { name_index: 4 },
//!         CpInfo::Utf8 { bytes: b"java/lang/Object".to_vec() },
//!         CpInfo::Utf8 { bytes: b"two".to_vec() },
//!         CpInfo::Utf8 { bytes: b"()I".to_vec() },
//!         CpInfo::Utf8 { bytes: b"Code".to_vec() },
//!     ]),
//!     access_flags: flags::ACC_PUBLIC | flags::ACC_SUPER,
//!     this_class: 1,
//!     super_class: 3,
//!     methods: vec![
//!         MethodInfo {
//!             access_flags: flags::ACC_STATIC,
//!             name_index: 5,
//!             descriptor_index: 6,
//!             attributes: vec![
//!                 CodeAttribute {
//!                     max_stack: 1,
//!                     max_locals: 0,
//!                     code: vec![insn::iconst_2, insn::ireturn],
//!                 }.to_attribute(7),
//!             ],
//!         },
//!     ],
//!     attributes: vec![],
//! };
//!
//! let bytes = class.to_bytes();
//! let read = ClassFile::parse(&bytes)?;
//! assert_eq!(read, class);
//!
//! assert_eq!(read.this_class_name()?, "Main");
//! let method = read.method_by_name("two")?.expect("the class has a method `two`");
//! let code = read.get_code(method)?.expect("`two` has code");
//! assert_eq!(code.code, vec![insn::iconst_2, insn::ireturn]);
//! # Ok::<(), kettle_class::Error>(())
//! ```
//!
//! Indices into the constant pool are resolved by [ConstantPool::resolve], which follows every index inside an entry.
use std::path::Path;
use log::trace;
use crate::pool::ConstantPool;
use crate::reader::ClassReader;

mod class_reader;
mod code;
mod error;
pub mod jstring;
pub mod pool;
pub mod reader;
mod writer;

pub use code::CodeAttribute;
pub use error::{Error, ErrorCategory, Result};

pub const MAGIC: u32 = 0xCAFEBABE;

/// A class file, as read from the binary representation.
///
/// The `interfaces` and `fields` items are always empty and therefore missing here.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
	pub magic: u32,
	pub minor_version: u16,
	pub major_version: u16,
	pub constant_pool: ConstantPool,
	pub access_flags: u16,
	pub this_class: u16,
	pub super_class: u16,
	pub methods: Vec<MethodInfo>,
	pub attributes: Vec<AttributeInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
	pub access_flags: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

/// An attribute with its contents left undecoded.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
	pub name_index: u16,
	pub info: Vec<u8>,
}

impl ClassFile {
	/// Reads a class file from its binary representation.
	pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
		class_reader::read(&mut ClassReader::new(bytes))
	}

	/// Reads the whole file into memory and parses it.
	///
	/// The file is closed again before parsing starts.
	pub fn read_file(path: impl AsRef<Path>) -> Result<ClassFile> {
		let path = path.as_ref();
		let bytes = std::fs::read(path)
			.map_err(|source| Error::Io { path: path.to_owned(), source })?;
		trace!("read {} bytes from {path:?}", bytes.len());

		ClassFile::parse(&bytes)
	}

	/// The internal name of this class, like `org/example/Main`.
	pub fn this_class_name(&self) -> Result<String> {
		self.constant_pool.resolve_class_name(self.this_class)
	}

	/// The internal name of the super class, or `None` for `java/lang/Object` itself.
	pub fn super_class_name(&self) -> Result<Option<String>> {
		if self.super_class == 0 {
			Ok(None)
		} else {
			self.constant_pool.resolve_class_name(self.super_class).map(Some)
		}
	}

	/// Finds the first method named `name`, ignoring its descriptor.
	pub fn method_by_name(&self, name: &str) -> Result<Option<&MethodInfo>> {
		for method in &self.methods {
			if self.constant_pool.resolve_utf8(method.name_index)? == name.as_bytes() {
				return Ok(Some(method));
			}
		}
		Ok(None)
	}
}

impl MethodInfo {
	pub fn name(&self, pool: &ConstantPool) -> Result<String> {
		pool.resolve_string(self.name_index)
	}

	pub fn descriptor(&self, pool: &ConstantPool) -> Result<String> {
		pool.resolve_string(self.descriptor_index)
	}
}

pub mod flags {
	pub const ACC_PUBLIC: u16       = 0x0001; // class, method
	pub const ACC_PRIVATE: u16      = 0x0002; // method
	pub const ACC_PROTECTED: u16    = 0x0004; // method
	pub const ACC_STATIC: u16       = 0x0008; // method
	pub const ACC_FINAL: u16        = 0x0010; // class, method
	pub const ACC_SUPER: u16        = 0x0020; // class
	pub const ACC_SYNCHRONIZED: u16 = 0x0020; // method
	pub const ACC_BRIDGE: u16       = 0x0040; // method
	pub const ACC_VARARGS: u16      = 0x0080; // method
	pub const ACC_NATIVE: u16       = 0x0100; // method
	pub const ACC_INTERFACE: u16    = 0x0200; // class
	pub const ACC_ABSTRACT: u16     = 0x0400; // class, method
	pub const ACC_STRICT: u16       = 0x0800; // method
	pub const ACC_SYNTHETIC: u16    = 0x1000; // class, method
	pub const ACC_ANNOTATION: u16   = 0x2000; // class
	pub const ACC_ENUM: u16         = 0x4000; // class

	const CLASS_FLAGS: [(u16, &str); 8] = [
		(ACC_PUBLIC, "ACC_PUBLIC"),
		(ACC_FINAL, "ACC_FINAL"),
		(ACC_SUPER, "ACC_SUPER"),
		(ACC_INTERFACE, "ACC_INTERFACE"),
		(ACC_ABSTRACT, "ACC_ABSTRACT"),
		(ACC_SYNTHETIC, "ACC_SYNTHETIC"),
		(ACC_ANNOTATION, "ACC_ANNOTATION"),
		(ACC_ENUM, "ACC_ENUM"),
	];

	/// The names of the class access flags set in `access_flags`, unknown bits are left out.
	pub fn class_flag_names(access_flags: u16) -> Vec<&'static str> {
		CLASS_FLAGS.iter()
			.filter(|(flag, _)| access_flags & flag != 0)
			.map(|&(_, name)| name)
			.collect()
	}
}

/// Opcodes of the instructions the interpreter knows about.
#[allow(non_upper_case_globals)]
pub mod insn {
	pub const iconst_0: u8 = 0x03;
	pub const iconst_1: u8 = 0x04;
	pub const iconst_2: u8 = 0x05;
	pub const bipush: u8 = 0x10;
	pub const ldc: u8 = 0x12;
	pub const iload_0: u8 = 0x1a;
	pub const iload_1: u8 = 0x1b;
	pub const aload_0: u8 = 0x2a;
	pub const istore_1: u8 = 0x3c;
	pub const iadd: u8 = 0x60;
	pub const iinc: u8 = 0x84;
	pub const if_icmpge: u8 = 0xa2;
	pub const if_icmple: u8 = 0xa4;
	pub const goto: u8 = 0xa7;
	pub const ireturn: u8 = 0xac;
	pub const r#return: u8 = 0xb1;
	pub const getstatic: u8 = 0xb2;
	pub const invokevirtual: u8 = 0xb6;
	pub const invokespecial: u8 = 0xb7;
	pub const invokestatic: u8 = 0xb8;

	/// The name of a known opcode.
	pub fn mnemonic(opcode: u8) -> Option<&'static str> {
		let name = match opcode {
			iconst_0 => "iconst_0",
			iconst_1 => "iconst_1",
			iconst_2 => "iconst_2",
			bipush => "bipush",
			ldc => "ldc",
			iload_0 => "iload_0",
			iload_1 => "iload_1",
			aload_0 => "aload_0",
			istore_1 => "istore_1",
			iadd => "iadd",
			iinc => "iinc",
			if_icmpge => "if_icmpge",
			if_icmple => "if_icmple",
			goto => "goto",
			ireturn => "ireturn",
			r#return => "return",
			getstatic => "getstatic",
			invokevirtual => "invokevirtual",
			invokespecial => "invokespecial",
			invokestatic => "invokestatic",
			_ => return None,
		};
		Some(name)
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::flags;
	use crate::insn;

	#[test]
	fn class_flags() {
		assert_eq!(flags::class_flag_names(0x0021), vec!["ACC_PUBLIC", "ACC_SUPER"]);
		assert_eq!(flags::class_flag_names(0x0000), Vec::<&str>::new());
		assert_eq!(flags::class_flag_names(0x4411), vec!["ACC_PUBLIC", "ACC_FINAL", "ACC_ABSTRACT", "ACC_ENUM"]);
	}

	#[test]
	fn mnemonics() {
		assert_eq!(insn::mnemonic(0xb1), Some("return"));
		assert_eq!(insn::mnemonic(insn::if_icmpge), Some("if_icmpge"));
		assert_eq!(insn::mnemonic(0xff), None);
	}
}
