//! Command-line entry point for the board test suite.

use clap::Parser;
use farmduino_test::board::Board;
use farmduino_test::console::{Console, RunMode};
use farmduino_test::port::{OpenSerialOptions, Port};
use farmduino_test::suite::Suite;
use simple_logger::SimpleLogger;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// How long the board takes to reset and boot after the serial port opens.
///
/// Opening the port toggles DTR, which resets the microcontroller.
const BOOT_DELAY: Duration = Duration::from_secs(2);

/// Test Farmduino and RAMPS/MEGA motion-control boards over a serial link.
///
/// Any of the port, board, and run mode that are not given on the command
/// line are asked for interactively.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
	/// The serial port the board is connected to, e.g. /dev/ttyACM0 or COM2.
	#[arg(short, long)]
	port: Option<String>,

	/// The board under test: `ramps` (or 0) or `farmduino` (or 1).
	#[arg(short, long)]
	board: Option<Board>,

	/// The run mode: 1 full output with prompts, 2 full output, 3 failed
	/// tests only.
	#[arg(short, long)]
	mode: Option<RunMode>,

	/// The baud rate.
	#[arg(long, default_value_t = OpenSerialOptions::DEFAULT_BAUD_RATE)]
	baud: u32,

	/// Where to save the results transcript.
	///
	/// Defaults to `<board>_board-test-results.txt` in the current directory.
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// List the serial ports on this machine and exit.
	#[arg(long)]
	list_ports: bool,

	/// Log the serial traffic as it happens.
	#[arg(short, long)]
	verbose: bool,
}

/// The serial port to suggest when asking for one interactively.
fn default_port() -> &'static str {
	if cfg!(target_os = "linux") {
		"/dev/ttyACM0"
	} else if cfg!(target_os = "macos") {
		"/dev/tty.usbmodem"
	} else {
		"COM2"
	}
}

/// Ask for the board until the answer parses. An empty answer means Farmduino.
fn ask_board(console: &mut Console) -> Result<Board, Box<dyn std::error::Error>> {
	loop {
		let answer = console.prompt("Board to test? 0 for RAMPS, 1 for Farmduino (1): ")?;
		if answer.trim().is_empty() {
			return Ok(Board::Farmduino);
		}
		match answer.parse() {
			Ok(board) => return Ok(board),
			Err(message) => console.line(message),
		}
	}
}

/// Ask for the run mode until the answer parses.
fn ask_mode(console: &mut Console) -> Result<RunMode, Box<dyn std::error::Error>> {
	console.line("Select a run mode:");
	console.line("  1: all tests, with prompts before each test");
	console.line("  2: all tests, no prompts");
	console.line("  3: print failed tests only, no prompts");
	loop {
		let answer = console.prompt("(1): ")?;
		if answer.trim().is_empty() {
			return Ok(RunMode::FullWithPrompts);
		}
		match answer.parse() {
			Ok(mode) => return Ok(mode),
			Err(message) => console.line(message),
		}
	}
}

/// Open the serial port, asking for a path until one opens if none was given
/// on the command line.
fn open_port(
	args: &Args,
	console: &mut Console,
) -> Result<Port<farmduino_test::backend::Serial>, Box<dyn std::error::Error>> {
	let mut options = OpenSerialOptions::new();
	options.baud_rate(args.baud);
	if let Some(path) = &args.port {
		return Ok(options.open(path)?);
	}
	loop {
		let answer = console.prompt(&format!("serial port ({}): ", default_port()))?;
		let path = if answer.trim().is_empty() {
			default_port().to_string()
		} else {
			answer
		};
		match options.open(&path) {
			Ok(port) => return Ok(port),
			Err(err) => console.line(format!("could not open {path}: {err}")),
		}
	}
}

/// Pause before exiting, saving any notes the technician types into the
/// transcript along with the results.
fn exit_notes(console: &mut Console) -> io::Result<()> {
	let notes = console.prompt("Press <Enter> to exit...\n")?;
	if !notes.is_empty() {
		console.line(format!("Notes: {notes}"));
		console.blank();
	}
	console.line("Exiting...");
	Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();
	SimpleLogger::new()
		.with_level(if args.verbose {
			log::LevelFilter::Debug
		} else {
			log::LevelFilter::Warn
		})
		.init()?;

	if args.list_ports {
		for info in serialport::available_ports()? {
			println!("{}", info.port_name);
		}
		return Ok(());
	}

	// The console starts in a verbose mode so the setup questions print on
	// their own lines; the real mode may itself be one of the answers.
	let mut console = Console::new(args.mode.unwrap_or(RunMode::Full));
	console.line(format!(
		"Farmduino board test suite v{}",
		env!("CARGO_PKG_VERSION")
	));
	console.blank();

	let board = match args.board {
		Some(board) => board,
		None => ask_board(&mut console)?,
	};
	let mode = match args.mode {
		Some(mode) => mode,
		None => ask_mode(&mut console)?,
	};
	console.line(format!("Run mode {mode} selected."));
	console.set_mode(mode);

	let port = open_port(&args, &mut console)?;
	if let Some(name) = port.name() {
		console.line(format!("Connected to {name}."));
	}
	// Opening the port resets the board; give the firmware time to boot and
	// print its startup banner before checking for it.
	thread::sleep(BOOT_DELAY);

	let mut suite = Suite::new(port, board, console);
	suite.check_firmware_banner()?;
	suite.run()?;

	let path = args
		.output
		.clone()
		.unwrap_or_else(|| PathBuf::from(format!("{board}_board-test-results.txt")));
	// Dropping the suite closes the serial port before the exit pause.
	let mut console = suite.into_console();
	exit_notes(&mut console)?;
	console.save(&path)?;
	println!("Results saved to {}.", path.display());
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;

	fn console_answering(answers: &'static str) -> Console {
		Console::with_input(RunMode::Full, Box::new(io::Cursor::new(answers.as_bytes())))
	}

	#[test]
	fn exit_notes_land_in_the_transcript() {
		let mut console = console_answering("flaky Z endstop\n");
		exit_notes(&mut console).unwrap();

		let transcript = console.transcript();
		assert!(transcript.contains("Press <Enter> to exit..."));
		assert!(transcript.contains("Notes: flaky Z endstop"));
		assert!(transcript.ends_with("Exiting...\n"));
	}

	#[test]
	fn empty_exit_notes_are_not_recorded() {
		let mut console = console_answering("\n");
		exit_notes(&mut console).unwrap();

		assert!(!console.transcript().contains("Notes:"));
		assert!(console.transcript().ends_with("Exiting...\n"));
	}
}
