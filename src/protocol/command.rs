//! Types for generating firmware commands.

use std::io;

/// The read mode of a pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PinMode {
	/// Digital read/write (0 or 1).
	Digital,
	/// Analog read/write (0 through 1023).
	Analog,
}

impl PinMode {
	/// The numeric value of the mode on the wire (the `M` token).
	pub fn code(self) -> u8 {
		match self {
			PinMode::Digital => 0,
			PinMode::Analog => 1,
		}
	}
}

impl std::fmt::Display for PinMode {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			PinMode::Digital => write!(f, "digital"),
			PinMode::Analog => write!(f, "analog"),
		}
	}
}

/// A single firmware command, e.g. `F41 P13 V1 M0`.
///
/// Use one of the constructors for the commands the test suite needs, or
/// [`new`](Command::new) for anything else. [`write_into`](Command::write_into)
/// appends the CRLF terminator the firmware expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
	/// The command text, without the line terminator.
	data: String,
}

impl Command {
	/// Create a command from raw command text (without the line terminator).
	pub fn new<T: Into<String>>(data: T) -> Command {
		Command { data: data.into() }
	}

	/// `F83`: report the firmware version.
	pub fn firmware_version() -> Command {
		Command::new("F83")
	}

	/// `F82`: report the current position.
	pub fn current_position() -> Command {
		Command::new("F82")
	}

	/// `G00`: move to the given position in steps.
	pub fn move_to(x: i32, y: i32, z: i32) -> Command {
		Command::new(format!("G00 X{x} Y{y} Z{z}"))
	}

	/// `F84`: mark the current position as zero on all axes.
	///
	/// The firmware confirms with a `R82 X0 Y0 Z0` position report.
	pub fn zero_axes() -> Command {
		Command::new("F84 X1 Y1 Z1")
	}

	/// `F22`: write a firmware parameter.
	pub fn write_parameter(number: u16, value: i32) -> Command {
		Command::new(format!("F22 P{number} V{value}"))
	}

	/// `F21`: read a firmware parameter back.
	pub fn read_parameter(number: u16) -> Command {
		Command::new(format!("F21 P{number}"))
	}

	/// `F41`: write a value to a pin.
	pub fn write_pin(pin: u8, value: u8, mode: PinMode) -> Command {
		Command::new(format!("F41 P{pin} V{value} M{}", mode.code()))
	}

	/// `F42`: read a pin.
	pub fn read_pin(pin: u8, mode: PinMode) -> Command {
		Command::new(format!("F42 P{pin} M{}", mode.code()))
	}

	/// The command text, without the line terminator.
	pub fn data(&self) -> &str {
		&self.data
	}

	/// The report code that carries this command's result.
	///
	/// Most commands are reported under the `R` code with the same digits
	/// (`F83` -> `R83`), but movement results arrive as `R82` position reports
	/// and pin reads as `R41` pin reports.
	pub fn reply_marker(&self) -> String {
		let code = self.data.split_whitespace().next().unwrap_or("");
		if code.starts_with("G0") {
			"R82".to_string()
		} else if code == "F42" {
			"R41".to_string()
		} else {
			format!("R{}", code.get(1..3).unwrap_or(""))
		}
	}

	/// Write the command and its CRLF terminator into the specified writer.
	pub fn write_into<W: io::Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
		write!(writer, "{}\r\n", self.data)
	}
}

impl std::fmt::Display for Command {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}", self.data)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn command_text() {
		assert_eq!(Command::firmware_version().data(), "F83");
		assert_eq!(Command::move_to(200, 0, -200).data(), "G00 X200 Y0 Z-200");
		assert_eq!(Command::zero_axes().data(), "F84 X1 Y1 Z1");
		assert_eq!(Command::write_parameter(11, 120).data(), "F22 P11 V120");
		assert_eq!(Command::read_parameter(11).data(), "F21 P11");
		assert_eq!(
			Command::write_pin(13, 1, PinMode::Digital).data(),
			"F41 P13 V1 M0"
		);
		assert_eq!(Command::read_pin(59, PinMode::Analog).data(), "F42 P59 M1");
	}

	#[test]
	fn reply_markers() {
		assert_eq!(Command::firmware_version().reply_marker(), "R83");
		assert_eq!(Command::current_position().reply_marker(), "R82");
		assert_eq!(Command::move_to(0, 200, 0).reply_marker(), "R82");
		assert_eq!(Command::read_pin(13, PinMode::Digital).reply_marker(), "R41");
		assert_eq!(
			Command::write_pin(13, 1, PinMode::Digital).reply_marker(),
			"R41"
		);
		assert_eq!(Command::read_parameter(11).reply_marker(), "R21");
		assert_eq!(Command::write_parameter(11, 120).reply_marker(), "R22");
	}

	#[test]
	fn write_into_appends_crlf() {
		let mut buf = Vec::new();
		Command::firmware_version().write_into(&mut buf).unwrap();
		assert_eq!(buf, b"F83\r\n");
	}
}
