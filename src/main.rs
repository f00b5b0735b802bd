use std::io::Write;
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, LevelFilter};
use kettle_class::{flags, ClassFile};
use kettle_vm::{Interpreter, Value};
use kettle_vm::trace::LogObserver;

/// Runs a method of a class file.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
	/// Log more, can be given up to three times.
	#[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
	verbose: u8,

	/// Log every executed instruction, needs `-vvv` to be visible.
	#[arg(short = 't', long = "trace")]
	trace: bool,

	/// The method to run.
	#[arg(short = 'm', long = "method", default_value = "main")]
	method: String,

	class_file: PathBuf,
}

fn level_filter(verbose: u8) -> LevelFilter {
	match verbose {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Info,
		2 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	}
}

fn setup_logger(level: LevelFilter) -> Result<()> {
	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.context("failed to set up logging")
}

/// A one line summary of the class, resolving its names.
fn describe(class: &ClassFile) -> Result<String> {
	let name = class.this_class_name().context("failed to resolve the class name")?;
	let super_name = class.super_class_name().context("failed to resolve the super class name")?;

	Ok(format!("class {name} (version {}.{}), extends {}, flags {:?}",
		class.major_version,
		class.minor_version,
		super_name.as_deref().unwrap_or("nothing"),
		flags::class_flag_names(class.access_flags),
	))
}

/// Loads the class and runs the method, with `out` as the program output.
fn run(cli: &Cli, out: &mut dyn Write) -> Result<Option<Value>> {
	let class = ClassFile::read_file(&cli.class_file)
		.with_context(|| format!("failed to load class file {:?}", cli.class_file))?;

	let summary = describe(&class)?;
	debug!("loaded {summary}");

	let interpreter = Interpreter::new(&class);
	let result = if cli.trace {
		interpreter.run_method_traced(&cli.method, out, &mut LogObserver)
	} else {
		interpreter.run_method(&cli.method, out)
	};
	out.flush().context("failed to flush program output")?;

	result.with_context(|| format!("failed to run method {:?} of {:?}", cli.method, cli.class_file))
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_logger(level_filter(cli.verbose))?;

	let stdout = std::io::stdout();
	match run(&cli, &mut stdout.lock())? {
		Some(value) => info!("{} returned {value}", cli.method),
		None => info!("{} returned", cli.method),
	}

	Ok(())
}
