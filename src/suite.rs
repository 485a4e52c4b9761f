//! The board test suite: categories, scoring, and the summary table.

use crate::backend::Backend;
use crate::board::{self, Board, EXPECTED_FIRMWARE_VERSION};
use crate::console::Console;
use crate::error::{Error, FirmwareNotDetectedError};
use crate::expect::Expectation;
use crate::params;
use crate::port::Port;
use crate::protocol::{Command, PinMode};
use chrono::Utc;
use std::time::Instant;

/// How many steps each movement test travels.
const MOVEMENT_TEST_STEPS: i32 = 200;

/// Printed whenever an exchange hits its response deadline.
const TIMEOUT_BANNER: &str = "***  RESPONSE TIMEOUT  ***";

/// A category of tests, tallied separately in the summary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
	/// Firmware version and current position.
	Misc,
	/// Axis moves, motor and encoder results.
	Movement,
	/// Peripheral and read-only pins.
	Pins,
	/// Firmware parameter write/read-back.
	Parameters,
}

impl std::fmt::Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Category::Misc => write!(f, "misc"),
			Category::Movement => write!(f, "movement"),
			Category::Pins => write!(f, "pins"),
			Category::Parameters => write!(f, "parameters"),
		}
	}
}

/// Pass/fail counts and elapsed time for one category.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Tally {
	/// How many tests ran.
	pub count: u32,
	/// How many tests passed.
	pub passed: u32,
	/// Wall-clock seconds the category took.
	pub seconds: f64,
}

impl Tally {
	/// The pass rate as a whole percentage, 0 if nothing ran.
	pub fn percent(&self) -> u32 {
		if self.count == 0 {
			0
		} else {
			(f64::from(self.passed) / f64::from(self.count) * 100.0).round() as u32
		}
	}
}

/// The tallies for a whole run.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Results {
	/// All categories combined.
	pub total: Tally,
	/// The misc category.
	pub misc: Tally,
	/// The movement category.
	pub movement: Tally,
	/// The pins category.
	pub pins: Tally,
	/// The parameters category.
	pub parameters: Tally,
}

impl Results {
	fn tally_mut(&mut self, category: Category) -> &mut Tally {
		match category {
			Category::Misc => &mut self.misc,
			Category::Movement => &mut self.movement,
			Category::Pins => &mut self.pins,
			Category::Parameters => &mut self.parameters,
		}
	}

	/// Record that a test ran.
	fn count(&mut self, category: Category) {
		self.total.count += 1;
		self.tally_mut(category).count += 1;
	}

	/// Record that a test passed.
	fn pass(&mut self, category: Category) {
		self.total.passed += 1;
		self.tally_mut(category).passed += 1;
	}
}

/// The full board test suite.
///
/// Construct one over an open [`Port`], verify the firmware banner, and call
/// [`run`](Suite::run).
pub struct Suite<B> {
	port: Port<B>,
	board: Board,
	console: Console,
	results: Results,
	/// The firmware version the board reported, once `F83` has run.
	firmware: Option<String>,
}

impl<B: Backend> std::fmt::Debug for Suite<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Suite")
			.field("port", &self.port)
			.field("board", &self.board)
			.finish_non_exhaustive()
	}
}

impl<B: Backend> Suite<B> {
	/// Create a suite for the given board over the given port.
	pub fn new(port: Port<B>, board: Board, console: Console) -> Suite<B> {
		Suite {
			port,
			board,
			console,
			results: Results::default(),
			firmware: None,
		}
	}

	/// The tallies so far.
	pub fn results(&self) -> &Results {
		&self.results
	}

	/// The firmware version the board reported, if the misc tests have run.
	pub fn firmware(&self) -> Option<&str> {
		self.firmware.as_deref()
	}

	/// Consume the suite and return its console, e.g. to save the transcript.
	pub fn into_console(self) -> Console {
		self.console
	}

	/// Check that the board announced its firmware after connecting.
	///
	/// The firmware prints report lines as it boots; a board that said
	/// nothing report-shaped has no firmware to test against.
	pub fn check_firmware_banner(&mut self) -> Result<(), Error> {
		let banner = self.port.drain()?;
		if banner.contains('R') {
			Ok(())
		} else {
			Err(FirmwareNotDetectedError::new().into())
		}
	}

	/// Run every test category and print the summary.
	pub fn run(&mut self) -> Result<(), Error> {
		let suite_start = Instant::now();

		self.results.parameters.seconds = self.timed(Self::write_parameters)?;
		self.results.misc.seconds = self.timed(Self::misc_tests)?;
		self.results.movement.seconds = self.timed(Self::movement_tests)?;
		self.results.pins.seconds = self.timed(Self::pin_tests)?;

		self.results.total.seconds = round_seconds(suite_start.elapsed().as_secs_f64());
		self.print_summary();
		Ok(())
	}

	/// Run one category and return its wall-clock seconds.
	fn timed(&mut self, category: fn(&mut Self) -> Result<(), Error>) -> Result<f64, Error> {
		let start = Instant::now();
		category(self)?;
		Ok(round_seconds(start.elapsed().as_secs_f64()))
	}

	/// Set firmware parameters to values for testing, reading each back.
	fn write_parameters(&mut self) -> Result<(), Error> {
		if self.skip_category("SET PARAMETERS")? {
			return Ok(());
		}
		for param in params::test_table() {
			self.console
				.label(&format!("{} {}: {} ", param.name, param.axis, param.value));
			if self.skip_test()? {
				continue;
			}
			self.exec(
				&Command::write_parameter(param.number, param.value),
				None,
				Category::Parameters,
				false,
			)?;
			let expected = Expectation::new(format!("P{} V{}", param.number, param.value));
			self.exec(
				&Command::read_parameter(param.number),
				Some(&expected),
				Category::Parameters,
				false,
			)?;
		}
		Ok(())
	}

	/// Firmware version and current position.
	fn misc_tests(&mut self) -> Result<(), Error> {
		if self.skip_category("PRELIMINARY TESTS:")? {
			return Ok(());
		}
		self.console.label("Return firmware version: ");
		if !self.skip_test()? {
			let expected = Expectation::new(EXPECTED_FIRMWARE_VERSION);
			self.firmware = self.exec(
				&Command::firmware_version(),
				Some(&expected),
				Category::Misc,
				false,
			)?;
		}
		self.console.label("Return current position: ");
		if !self.skip_test()? {
			let expected = Expectation::new("X0 Y0 Z0");
			self.exec(
				&Command::current_position(),
				Some(&expected),
				Category::Misc,
				false,
			)?;
		}
		Ok(())
	}

	/// Each axis forward and backward, scoring motor and encoder separately.
	fn movement_tests(&mut self) -> Result<(), Error> {
		if self.skip_category("MOVEMENT TESTS:")? {
			return Ok(());
		}
		for (axis_index, axis) in ["X", "Y", "Z"].into_iter().enumerate() {
			for direction in [1, -1] {
				let text_direction = if direction > 0 { "forward" } else { "backward" };
				self.console.line(format!("Move {axis} axis {text_direction}:"));
				if self.skip_test()? {
					continue;
				}
				let mut steps = [0i32; 3];
				steps[axis_index] = MOVEMENT_TEST_STEPS * direction;
				let expected =
					Expectation::new(format!("X{} Y{} Z{}", steps[0], steps[1], steps[2]));
				self.exec(
					&Command::move_to(steps[0], steps[1], steps[2]),
					Some(&expected),
					Category::Movement,
					false,
				)?;
				self.reset_position()?;
			}
		}
		Ok(())
	}

	/// Toggle and read back each peripheral pin, then check the read-only pins.
	fn pin_tests(&mut self) -> Result<(), Error> {
		if self.skip_category("PIN TESTS:")? {
			return Ok(());
		}
		for &pin in self.board.peripheral_pins() {
			for value in [1u8, 0] {
				let text_value = if value > 0 { "on" } else { "off" };
				self.console.label(&format!("Turn pin {pin} {text_value}: "));
				if self.skip_test()? {
					continue;
				}
				self.exec(
					&Command::write_pin(pin, value, PinMode::Digital),
					None,
					Category::Pins,
					false,
				)?;
				let expected = Expectation::new(format!("P{pin} V{value}"));
				self.exec(
					&Command::read_pin(pin, PinMode::Digital),
					Some(&expected),
					Category::Pins,
					false,
				)?;
			}
		}
		for pin in board::read_only_pins() {
			self.console.label(&format!(
				"Read pin {} - {} - {} read mode: ",
				pin.number, pin.description, pin.mode
			));
			if !self.skip_test()? {
				self.exec(
					&Command::read_pin(pin.number, pin.mode),
					Some(&pin.expected),
					Category::Pins,
					false,
				)?;
			}
		}
		Ok(())
	}

	/// Re-zero all axes and wait for the confirming position report.
	fn reset_position(&mut self) -> Result<(), Error> {
		self.exec(&Command::zero_axes(), None, Category::Misc, true)?;
		let exchange = self.port.wait_for_home()?;
		if exchange.timed_out() {
			self.console.line(TIMEOUT_BANNER);
		}
		Ok(())
	}

	/// Send one command and, if an expectation is given, score its report.
	///
	/// Movement tests score two reports per command: the `R82` position
	/// report for the motor and the `R84` encoder report, which counts as a
	/// test of its own. Returns the observed value tokens of the last report
	/// scored, which is how the firmware version gets recorded.
	fn exec(
		&mut self,
		cmd: &Command,
		expected: Option<&Expectation>,
		category: Category,
		quiet: bool,
	) -> Result<Option<String>, Error> {
		if expected.is_some() {
			self.results.count(category);
		}
		if self.console.mode().verbose() && !quiet {
			self.console.line(format!("{:<11}{}", "SENDING:", cmd.data()));
		}
		let exchange = self.port.request(cmd)?;
		if exchange.timed_out() {
			self.console.line(TIMEOUT_BANNER);
		}

		let movement = matches!(category, Category::Movement);
		let markers = if movement {
			vec![cmd.reply_marker(), "R84".to_string()]
		} else {
			vec![cmd.reply_marker()]
		};
		let indent = if movement { "  " } else { "" };

		let mut last_output = None;
		for (i, marker) in markers.iter().enumerate() {
			if movement {
				if i == 0 {
					self.console.label("Motor: ");
				} else {
					self.console.label("Encoder: ");
					// The encoder result is a test in its own right.
					self.results.count(category);
				}
			}
			let report = exchange.report_for(marker);
			let received = report.as_ref().map(|r| r.raw().to_string());
			let output = report.as_ref().map(|r| r.values().to_string());
			let result = expected.map(|e| e.check(output.as_deref()));
			if result == Some(true) {
				self.results.pass(category);
			}
			self.print_case(indent, cmd, received.as_deref(), output.as_deref(), expected, result);
			last_output = output;
		}
		Ok(last_output)
	}

	/// Print one scored command according to the run mode.
	fn print_case(
		&mut self,
		indent: &str,
		cmd: &Command,
		received: Option<&str>,
		output: Option<&str>,
		expected: Option<&Expectation>,
		result: Option<bool>,
	) {
		let verbose = self.console.mode().verbose();
		let failed = result == Some(false);
		if failed || verbose {
			if let Some(expected) = expected {
				if failed && !verbose {
					// The command was not echoed when it was sent, so repeat
					// it with the failure breakdown.
					self.console.blank();
					self.console
						.line(format!("{indent}{:<11}{}", "SENT:", cmd.data()));
				}
				self.console.line(format!(
					"{indent}{:<11}{}",
					"RECEIVED:",
					received.unwrap_or("(no response)")
				));
				self.console.line(format!(
					"{indent}{:<11}{}",
					"VALUE(S):",
					output.unwrap_or("(none)")
				));
				self.console
					.line(format!("{indent}{:<11}{}", "EXPECTED:", expected.text()));
				self.console.line(format!(
					"{indent}{:<11}{}",
					"RESULT:",
					if result == Some(true) { "PASS" } else { "FAIL" }
				));
				self.console.blank();
			}
		} else if result.is_some() && received.is_some() {
			self.console.line(format!("{indent}PASS"));
		}
	}

	/// Print the category banner and, with prompts on, offer to skip it.
	fn skip_category(&mut self, title: &str) -> Result<bool, Error> {
		let line = "=".repeat(35);
		self.console.blank();
		self.console.line(&line);
		self.console.line(title);
		self.console.line(&line);
		if self.console.mode().prompts() {
			let answer = self.console.prompt("Continue?\n")?;
			return Ok(answer.trim() == "s");
		}
		Ok(false)
	}

	/// With prompts on, pause before the next test. An `s` answer skips it.
	fn skip_test(&mut self) -> Result<bool, Error> {
		if self.console.mode().prompts() {
			let answer = self.console.prompt("begin test?")?;
			return Ok(answer.trim() == "s");
		}
		Ok(false)
	}

	/// Print the board, firmware, date, and per-category tallies.
	fn print_summary(&mut self) {
		let line = "=".repeat(50);
		self.console.blank();
		self.console.line(&line);
		self.console.line("TEST RESULTS");
		self.console.line(format!("{:<11}{}", "BOARD:", self.board));
		self.console.line(format!(
			"{:<11}{}",
			"FIRMWARE:",
			self.firmware.as_deref().unwrap_or("(not reported)")
		));
		self.console.line(format!(
			"{:<11}{} UTC",
			"TEST DATE:",
			Utc::now().format("%Y-%m-%d %H:%M")
		));
		self.console.line(&line);
		self.console.line(format!(
			"{:<12}{:<8}{:<9}{:<10}{}",
			"CATEGORY", "PASS", "COUNT", "PERCENT", "TIME (sec)"
		));
		let rows = [
			("total", self.results.total),
			("misc", self.results.misc),
			("movement", self.results.movement),
			("pins", self.results.pins),
			("parameters", self.results.parameters),
		];
		for (name, tally) in rows {
			self.console.line(format!(
				"{:<12}{:>4}{:>9}{:>9}%{:>13.2}",
				name,
				tally.passed,
				tally.count,
				tally.percent(),
				tally.seconds
			));
		}
		self.console.line(&line);
		self.console.blank();
	}
}

/// Round to hundredths of a second for the summary table.
fn round_seconds(seconds: f64) -> f64 {
	(seconds * 100.0).round() / 100.0
}
