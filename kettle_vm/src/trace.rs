//! Structured events about what the interpreter does, for diagnostics.
//!
//! Events go to an [`ExecutionObserver`], never to the program output.

use std::fmt::{Display, Formatter};
use log::trace;
use crate::native::NativeKey;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
	/// An instruction is about to be executed.
	Instruction {
		offset: usize,
		opcode: u8,
		mnemonic: &'static str,
	},
	/// A branch was taken.
	Branch {
		from: usize,
		to: usize,
	},
	NativeCall {
		key: NativeKey,
	},
	/// The method completed, with the value it returned.
	Return {
		value: Option<Value>,
	},
}

impl Display for TraceEvent {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			TraceEvent::Instruction { offset, opcode, mnemonic } => write!(f, "{offset:>5}: {mnemonic} ({opcode:#04x})"),
			TraceEvent::Branch { from, to } => write!(f, "branch {from} -> {to}"),
			TraceEvent::NativeCall { key } => write!(f, "native {key}"),
			TraceEvent::Return { value: Some(value) } => write!(f, "return {value}"),
			TraceEvent::Return { value: None } => write!(f, "return"),
		}
	}
}

pub trait ExecutionObserver {
	fn on_event(&mut self, event: &TraceEvent);
}

/// Ignores all events.
impl ExecutionObserver for () {
	fn on_event(&mut self, _event: &TraceEvent) {}
}

/// Records all events.
impl ExecutionObserver for Vec<TraceEvent> {
	fn on_event(&mut self, event: &TraceEvent) {
		self.push(event.clone());
	}
}

/// Forwards all events to the `log` facade, at `trace` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ExecutionObserver for LogObserver {
	fn on_event(&mut self, event: &TraceEvent) {
		trace!("{event}");
	}
}
