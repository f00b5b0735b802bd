use std::io::Write;
use log::debug;
use kettle_class::{insn, ClassFile, CodeAttribute};
use kettle_class::reader::ClassReader;
use crate::descriptor::MethodDescriptor;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::native::{NativeKey, NativeRegistry};
use crate::trace::{ExecutionObserver, TraceEvent};
use crate::value::Value;

/// What happened in a single [`Interpreter::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
	/// The frame moved on to the next instruction.
	Continue,
	/// The method completed, with the value it returned.
	Return(Option<Value>),
}

/// Executes the code of methods of a class.
///
/// The class is only borrowed, each execution gets its own [`Frame`].
#[derive(Debug)]
pub struct Interpreter<'c> {
	class: &'c ClassFile,
	natives: NativeRegistry,
}

impl<'c> Interpreter<'c> {
	/// An interpreter with the default natives, see [`NativeRegistry::default`].
	pub fn new(class: &'c ClassFile) -> Interpreter<'c> {
		Interpreter::with_natives(class, NativeRegistry::default())
	}

	pub fn with_natives(class: &'c ClassFile, natives: NativeRegistry) -> Interpreter<'c> {
		Interpreter { class, natives }
	}

	/// Runs the first method named `name`.
	pub fn run_method(&self, name: &str, out: &mut dyn Write) -> Result<Option<Value>> {
		self.run_method_traced(name, out, &mut ())
	}

	pub fn run_method_traced(&self, name: &str, out: &mut dyn Write, observer: &mut dyn ExecutionObserver) -> Result<Option<Value>> {
		let method = self.class.method_by_name(name)?
			.ok_or_else(|| Error::MethodNotFound { name: name.to_owned() })?;
		let code = self.class.get_code(method)?
			.ok_or_else(|| Error::MissingCode { name: name.to_owned() })?;

		let descriptor = method.descriptor(&self.class.constant_pool)?;
		debug!("running method {name:?} with descriptor {descriptor}");
		self.execute_traced(&code, out, observer)
	}

	/// Runs `code` in a fresh frame until it returns or runs off its end.
	pub fn execute(&self, code: &CodeAttribute, out: &mut dyn Write) -> Result<Option<Value>> {
		self.execute_traced(code, out, &mut ())
	}

	pub fn execute_traced(&self, code: &CodeAttribute, out: &mut dyn Write, observer: &mut dyn ExecutionObserver) -> Result<Option<Value>> {
		debug!("executing {} bytes of code, max_stack {}, max_locals {}", code.code.len(), code.max_stack, code.max_locals);

		let mut frame = Frame::new(code);
		loop {
			if let Step::Return(value) = self.step(&mut frame, out, observer)? {
				observer.on_event(&TraceEvent::Return { value: value.clone() });
				debug!("returned {value:?} at offset {}", frame.pc());
				return Ok(value);
			}
		}
	}

	/// Executes the instruction at the program counter of `frame`.
	///
	/// If this fails, the frame is left as it was before, except for a failing native call.
	pub fn step(&self, frame: &mut Frame, out: &mut dyn Write, observer: &mut dyn ExecutionObserver) -> Result<Step> {
		let code = frame.code();
		let offset = frame.pc();
		let Some(&opcode) = code.get(offset) else {
			return Ok(Step::Return(None));
		};
		let mnemonic = insn::mnemonic(opcode)
			.ok_or(Error::UnimplementedOpcode { opcode, offset })?;
		observer.on_event(&TraceEvent::Instruction { offset, opcode, mnemonic });

		let pool = &self.class.constant_pool;
		let mut operands = ClassReader::at(code, offset + 1);

		match opcode {
			insn::getstatic => {
				let field = pool.resolve_field_ref(operands.read_u16()?)?;
				frame.push(Value::Reference(field), offset)?;
			},
			insn::ldc => {
				let constant = pool.resolve(operands.read_u8()? as u16)?;
				frame.push(Value::Constant(constant), offset)?;
			},
			insn::invokevirtual => {
				let method = pool.resolve_method_ref(operands.read_u16()?)?;
				let descriptor = MethodDescriptor::parse(&method.descriptor)?;

				let count = descriptor.parameters.len() + 1;
				let Some((receiver, args)) = frame.peek(count, opcode, offset)?.split_first() else {
					return Err(Error::StackUnderflow { opcode, offset });
				};
				let Value::Reference(field) = receiver else {
					return Err(Error::UnsupportedReceiver { receiver: receiver.clone(), offset });
				};

				let key = NativeKey::for_call(field, &method);
				observer.on_event(&TraceEvent::NativeCall { key: key.clone() });
				let result = self.natives.invoke(&key, out, args)?;
				if result.is_none() && !descriptor.is_void() {
					return Err(Error::MissingReturnValue { key, offset });
				}

				frame.discard(count);
				if let (false, Some(value)) = (descriptor.is_void(), result) {
					frame.push(value, offset)?;
				}
			},
			insn::invokespecial => {
				operands.read_u16()?;
			},
			insn::invokestatic => {
				let method = pool.resolve_method_ref(operands.read_u16()?)?;
				return Err(Error::NotImplemented { mnemonic, offset, method: method.to_string() });
			},
			insn::r#return => {
				frame.jump(operands.position());
				return Ok(Step::Return(None));
			},
			insn::ireturn => {
				let [value] = frame.pop_ints::<1>(opcode, offset)?;
				frame.jump(operands.position());
				return Ok(Step::Return(Some(Value::Int(value))));
			},
			insn::iload_0 | insn::aload_0 => {
				let value = frame.local(0, offset)?.clone();
				frame.push(value, offset)?;
			},
			insn::iload_1 => {
				let value = frame.local(1, offset)?.clone();
				frame.push(value, offset)?;
			},
			insn::istore_1 => {
				frame.local(1, offset)?;
				let [value] = frame.pop_ints::<1>(opcode, offset)?;
				*frame.local_mut(1, offset)? = Value::Int(value);
			},
			insn::iconst_0 => frame.push(Value::Int(0), offset)?,
			insn::iconst_1 => frame.push(Value::Int(1), offset)?,
			insn::iconst_2 => frame.push(Value::Int(2), offset)?,
			insn::bipush => {
				let value = operands.read_i8()?;
				frame.push(Value::Int(value as i32), offset)?;
			},
			insn::iadd => {
				let [a, b] = frame.pop_ints::<2>(opcode, offset)?;
				frame.push(Value::Int(a.wrapping_add(b)), offset)?;
			},
			insn::if_icmpge | insn::if_icmple => {
				let target = branch_target(offset, operands.read_i16()?, code.len())?;
				let [a, b] = frame.pop_ints::<2>(opcode, offset)?;

				let taken = if opcode == insn::if_icmpge { a >= b } else { a <= b };
				if taken {
					observer.on_event(&TraceEvent::Branch { from: offset, to: target });
					frame.jump(target);
					return Ok(Step::Continue);
				}
			},
			insn::goto => {
				let target = branch_target(offset, operands.read_i16()?, code.len())?;
				observer.on_event(&TraceEvent::Branch { from: offset, to: target });
				frame.jump(target);
				return Ok(Step::Continue);
			},
			insn::iinc => {
				let index = operands.read_u8()? as usize;
				let constant = operands.read_i8()?;

				let local = frame.local_mut(index, offset)?;
				let value = local.as_int()
					.ok_or_else(|| Error::TypeMismatch { expected: "int", found: local.clone(), offset })?;
				*local = Value::Int(value.wrapping_add(constant as i32));
			},
			_ => return Err(Error::UnimplementedOpcode { opcode, offset }),
		}

		frame.jump(operands.position());
		Ok(Step::Continue)
	}
}

/// The target of a branch at `offset`, relative to the branch opcode itself.
///
/// A target right at the end of the code is allowed, and ends the execution.
fn branch_target(offset: usize, relative: i16, code_len: usize) -> Result<usize> {
	let target = offset as isize + relative as isize;
	match usize::try_from(target) {
		Ok(target) if target <= code_len => Ok(target),
		_ => Err(Error::BranchOutOfRange { offset, target }),
	}
}
