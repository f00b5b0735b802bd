use kettle_class::CodeAttribute;
use crate::error::{Error, Result};
use crate::value::Value;

/// The state of one method execution: the program counter, the operand stack and the local variables.
///
/// All the checked operations here either succeed or leave the frame as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
	code: &'a [u8],
	pc: usize,
	stack: Vec<Value>,
	max_stack: u16,
	locals: Vec<Value>,
}

impl<'a> Frame<'a> {
	/// A frame at the start of `code`, with an empty stack and all locals set to `0`.
	pub fn new(code: &'a CodeAttribute) -> Frame<'a> {
		Frame {
			code: &code.code,
			pc: 0,
			stack: Vec::with_capacity(code.max_stack as usize),
			max_stack: code.max_stack,
			locals: vec![Value::default(); code.max_locals as usize],
		}
	}

	pub fn code(&self) -> &'a [u8] {
		self.code
	}

	pub fn pc(&self) -> usize {
		self.pc
	}

	/// The operand stack, the top is the last element.
	pub fn stack(&self) -> &[Value] {
		&self.stack
	}

	pub fn locals(&self) -> &[Value] {
		&self.locals
	}

	pub(crate) fn jump(&mut self, pc: usize) {
		self.pc = pc;
	}

	pub(crate) fn push(&mut self, value: Value, offset: usize) -> Result<()> {
		if self.stack.len() >= self.max_stack as usize {
			return Err(Error::StackOverflow { max_stack: self.max_stack, offset });
		}
		self.stack.push(value);
		Ok(())
	}

	/// The topmost `n` values, the top of the stack being the last.
	pub(crate) fn peek(&self, n: usize, opcode: u8, offset: usize) -> Result<&[Value]> {
		self.stack.len().checked_sub(n)
			.map(|start| &self.stack[start..])
			.ok_or(Error::StackUnderflow { opcode, offset })
	}

	/// Removes the topmost `n` values. Only call this after a successful [`Frame::peek`] of at least `n` values.
	pub(crate) fn discard(&mut self, n: usize) {
		let len = self.stack.len().saturating_sub(n);
		self.stack.truncate(len);
	}

	/// Pops `N` ints, giving them back in the order they were pushed.
	pub(crate) fn pop_ints<const N: usize>(&mut self, opcode: u8, offset: usize) -> Result<[i32; N]> {
		let mut ints = [0; N];
		for (int, value) in ints.iter_mut().zip(self.peek(N, opcode, offset)?) {
			*int = value.as_int()
				.ok_or_else(|| Error::TypeMismatch { expected: "int", found: value.clone(), offset })?;
		}
		self.discard(N);
		Ok(ints)
	}

	pub(crate) fn local(&self, index: usize, offset: usize) -> Result<&Value> {
		self.locals.get(index)
			.ok_or(Error::LocalOutOfRange { index, max_locals: self.locals.len() as u16, offset })
	}

	pub(crate) fn local_mut(&mut self, index: usize, offset: usize) -> Result<&mut Value> {
		let max_locals = self.locals.len() as u16;
		self.locals.get_mut(index)
			.ok_or(Error::LocalOutOfRange { index, max_locals, offset })
	}
}
