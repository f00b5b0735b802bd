use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::sync::mpsc::{self, Receiver};
use log::LevelFilter;
use pretty_assertions::assert_eq;
use kettle_class::{flags, insn, ClassFile, CodeAttribute, MethodInfo, MAGIC};
use kettle_class::pool::{ConstantPool, CpInfo};
use kettle_vm::{Error, Interpreter, Value};
use kettle_vm::trace::LogObserver;

/// The log records, as formatted lines. All tests here change the global max level, so they lock this while running.
fn captured_log() -> MutexGuard<'static, Receiver<String>> {
	static LOG: OnceLock<Mutex<Receiver<String>>> = OnceLock::new();

	LOG.get_or_init(|| {
		let (sender, receiver) = mpsc::channel();
		fern::Dispatch::new()
			.level(LevelFilter::Trace)
			.chain(sender)
			.apply()
			.expect("no other logger is set up in this test binary");
		Mutex::new(receiver)
	})
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
}

fn utf8(s: &str) -> CpInfo {
	CpInfo::Utf8 { bytes: s.as_bytes().to_vec() }
}

/// A class with `main` printing `hello` and returning `1`, and `broken` pointing to a missing descriptor.
fn class() -> ClassFile {
	let code = CodeAttribute {
		max_stack: 2,
		max_locals: 0,
		code: vec![
			insn::getstatic, 0, 1,
			insn::ldc, 7,
			insn::invokevirtual, 0, 9,
			insn::iconst_1,
			insn::ireturn,
		],
	};
	let method = |name_index, descriptor_index| MethodInfo {
		access_flags: flags::ACC_PUBLIC | flags::ACC_STATIC,
		name_index,
		descriptor_index,
		attributes: vec![code.to_attribute(15)],
	};

	ClassFile {
		magic: MAGIC,
		minor_version: 0,
		major_version: 52,
		constant_pool: ConstantPool::new(vec![
			/*  1 */ CpInfo::Fieldref { class_index: 2, name_and_type_index: 4 },
			/*  2 */ CpInfo::Class { name_index: 3 },
			/*  3 */ utf8("java/lang/System"),
			/*  4 */ CpInfo::NameAndType { name_index: 5, descriptor_index: 6 },
			/*  5 */ utf8("out"),
			/*  6 */ utf8("Ljava/io/PrintStream;"),
			/*  7 */ CpInfo::String { string_index: 8 },
			/*  8 */ utf8("hello"),
			/*  9 */ CpInfo::Methodref { class_index: 10, name_and_type_index: 12 },
			/* 10 */ CpInfo::Class { name_index: 11 },
			/* 11 */ utf8("java/io/PrintStream"),
			/* 12 */ CpInfo::NameAndType { name_index: 13, descriptor_index: 14 },
			/* 13 */ utf8("println"),
			/* 14 */ utf8("(Ljava/lang/String;)V"),
			/* 15 */ utf8("Code"),
			/* 16 */ utf8("main"),
			/* 17 */ utf8("()I"),
			/* 18 */ utf8("broken"),
		]),
		access_flags: flags::ACC_PUBLIC,
		this_class: 0,
		super_class: 0,
		methods: vec![
			method(16, 17),
			method(18, 99),
		],
		attributes: vec![],
	}
}

#[test]
fn log_observer_writes_to_the_log_only() -> anyhow::Result<()> {
	let log = captured_log();
	log::set_max_level(LevelFilter::Trace);
	while log.try_recv().is_ok() {}

	let class = class();
	let mut out = Vec::new();
	let result = Interpreter::new(&class).run_method_traced("main", &mut out, &mut LogObserver)?;
	assert_eq!(result, Some(Value::Int(1)));
	assert_eq!(String::from_utf8(out)?, "hello\n");

	let lines: Vec<String> = log.try_iter()
		.map(|line| line.trim_end().to_owned())
		.collect();
	for expected in [
		"    0: getstatic (0xb2)",
		"    5: invokevirtual (0xb6)",
		"native java/lang/System.out.println(Ljava/lang/String;)V",
		"return 1",
	] {
		assert!(lines.iter().any(|line| line == expected), "{expected:?} is missing in {lines:#?}");
	}
	Ok(())
}

#[test]
fn result_does_not_depend_on_the_log_level() -> anyhow::Result<()> {
	let _log = captured_log();
	let class = class();

	for level in [LevelFilter::Off, LevelFilter::Warn, LevelFilter::Debug, LevelFilter::Trace] {
		log::set_max_level(level);
		let interpreter = Interpreter::new(&class);

		let mut out = Vec::new();
		assert_eq!(interpreter.run_method("main", &mut out)?, Some(Value::Int(1)), "at level {level}");
		assert_eq!(out, b"hello\n", "at level {level}");

		let mut out = Vec::new();
		assert!(
			matches!(
				interpreter.run_method_traced("broken", &mut out, &mut LogObserver),
				Err(Error::Class(kettle_class::Error::IndexOutOfRange { index: 99, count: 19 }))
			),
			"at level {level}"
		);
		assert!(out.is_empty(), "at level {level}");
	}
	Ok(())
}
