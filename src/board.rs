//! The boards under test and their fixed test points.

use crate::expect::Expectation;
use crate::protocol::PinMode;

/// The firmware version the suite expects `F83` to report.
pub const EXPECTED_FIRMWARE_VERSION: &str = "4.0.2";

/// Peripheral pins wired up on a RAMPS/MEGA board.
const RAMPS_PERIPHERAL_PINS: &[u8] = &[13, 10, 9, 8];

/// Peripheral pins wired up on a Farmduino board.
const FARMDUINO_PERIPHERAL_PINS: &[u8] = &[13, 7, 8, 9, 10, 12];

/// The soil sensor pin. Left floating it reads near the top of the ADC range.
const SOIL_SENSOR_PIN: u8 = 59;

/// The tool verification pin. Reads 1 when connected to ground.
const TOOL_VERIFICATION_PIN: u8 = 63;

/// A motion-control board this tool can exercise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Board {
	/// An Arduino MEGA with a RAMPS shield.
	Ramps,
	/// A Farmduino.
	Farmduino,
}

impl Board {
	/// The peripheral pins to toggle and read back during the pin tests.
	pub fn peripheral_pins(self) -> &'static [u8] {
		match self {
			Board::Ramps => RAMPS_PERIPHERAL_PINS,
			Board::Farmduino => FARMDUINO_PERIPHERAL_PINS,
		}
	}
}

impl std::fmt::Display for Board {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Board::Ramps => write!(f, "RAMPS"),
			Board::Farmduino => write!(f, "Farmduino"),
		}
	}
}

impl std::str::FromStr for Board {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"0" | "ramps" => Ok(Board::Ramps),
			"1" | "farmduino" => Ok(Board::Farmduino),
			other => Err(format!("unknown board `{other}` (expected `ramps` or `farmduino`)")),
		}
	}
}

/// A pin the suite only reads, never writes.
#[derive(Debug, Clone)]
pub struct ReadOnlyPin {
	/// What the pin is wired to, for the test prompt.
	pub description: &'static str,
	/// The pin number.
	pub number: u8,
	/// The read mode.
	pub mode: PinMode,
	/// The expected reading.
	pub expected: Expectation,
}

/// The read-only pins checked at the end of the pin tests, on every board.
pub fn read_only_pins() -> Vec<ReadOnlyPin> {
	vec![
		ReadOnlyPin {
			description: "soil sensor",
			number: SOIL_SENSOR_PIN,
			mode: PinMode::Analog,
			expected: Expectation::new(format!("P{SOIL_SENSOR_PIN} V>1000")),
		},
		ReadOnlyPin {
			description: "tool verification (connect to ground)",
			number: TOOL_VERIFICATION_PIN,
			mode: PinMode::Digital,
			expected: Expectation::new(format!("P{TOOL_VERIFICATION_PIN} V1")),
		},
	]
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn peripheral_pins_per_board() {
		assert_eq!(Board::Ramps.peripheral_pins(), &[13, 10, 9, 8]);
		assert_eq!(Board::Farmduino.peripheral_pins(), &[13, 7, 8, 9, 10, 12]);
	}

	#[test]
	fn board_from_str() {
		assert_eq!("ramps".parse::<Board>().unwrap(), Board::Ramps);
		assert_eq!("0".parse::<Board>().unwrap(), Board::Ramps);
		assert_eq!("Farmduino".parse::<Board>().unwrap(), Board::Farmduino);
		assert_eq!("1".parse::<Board>().unwrap(), Board::Farmduino);
		assert!("mega".parse::<Board>().is_err());
	}

	#[test]
	fn read_only_pin_expectations() {
		let pins = read_only_pins();
		assert_eq!(pins[0].number, 59);
		assert!(pins[0].expected.check(Some("P59 V1023")));
		assert_eq!(pins[1].number, 63);
		assert!(pins[1].expected.check(Some("P63 V1")));
	}
}
