//! A small interpreter for the bytecode of methods read by [`kettle_class`].
//!
//! Only a handful of instructions are supported, enough for integer arithmetic, simple loops and printing through natives like
//! `System.out.println`. There is no heap, no object model and no calls between methods of the class.
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use kettle_class::{ClassFile, CodeAttribute, insn, MAGIC};
//! use kettle_class::pool::ConstantPool;
//! use kettle_vm::{Interpreter, Value};
//!
//! let class = ClassFile {
//!     magic: MAGIC,
//!     minor_version: 0,
//!     major_version: 52,
//!     constant_pool: ConstantPool::default(),
//!     access_flags: 0,
//!     this_class: 0,
//!     super_class: 0,
//!     methods: vec![],
//!     attributes: vec![],
//! };
//! let code = CodeAttribute {
//!     max_stack: 2,
//!     max_locals: 0,
//!     code: vec![insn::bipush, 40, insn::iconst_2, insn::iadd, insn::ireturn],
//! };
//!
//! let mut out = Vec::new();
//! let result = Interpreter::new(&class).execute(&code, &mut out)?;
//! assert_eq!(result, Some(Value::Int(42)));
//! assert!(out.is_empty());
//! # Ok::<(), kettle_vm::Error>(())
//! ```

pub mod descriptor;
mod error;
mod frame;
mod interpreter;
pub mod native;
pub mod trace;
mod value;

pub use error::{Error, Result};
pub use frame::Frame;
pub use interpreter::{Interpreter, Step};
pub use value::Value;
