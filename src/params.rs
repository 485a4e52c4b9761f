//! The firmware parameter table the suite writes and reads back.
//!
//! Parameter numbers come in per-axis triples (x, y, z occupy consecutive
//! numbers) plus a few one-off entries. The values are the ones the suite
//! runs with, not the firmware defaults: endstops and encoder positioning are
//! off so a bare board on the bench can move, encoders themselves are on so
//! the movement tests exercise them.

/// One firmware parameter together with the value the suite writes to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
	/// The human-readable parameter group name.
	pub name: &'static str,
	/// Which axis (or pseudo-axis) this number belongs to.
	pub axis: &'static str,
	/// The parameter number (the `P` token).
	pub number: u16,
	/// The value to write and expect back (the `V` token).
	pub value: i32,
}

/// Per-axis parameter groups: name, first parameter number (x; y and z
/// follow), and the test value.
const AXIS_GROUPS: &[(&str, u16, i32)] = &[
	("Movement timeout (seconds)", 11, 120),
	("Keep motor active", 15, 0),
	("Home at boot", 18, 0),
	("Enable endstops", 25, 0),
	("Invert motor", 31, 0),
	("Acceleration (steps)", 41, 500),
	("Stop at home", 45, 0),
	("Negatives only", 51, 0),
	("Min speed (steps/s)", 61, 50),
	("Max speed (steps/s)", 71, 800),
	("Enable encoders", 101, 1),
	("Encoder type", 105, 0),
	("Missed steps", 111, 10),
	("Encoder scaling", 115, 56),
	("Decay (steps)", 121, 10),
	("Use encoders for positioning", 125, 0),
	("Invert encoders", 131, 0),
	("Axis length (steps)", 141, 0),
	("Stop at max", 145, 0),
];

/// One-off parameters, appended after the per-axis groups.
const SINGLE_PARAMETERS: &[Parameter] = &[
	Parameter {
		name: "E-STOP on movement error",
		axis: "NA",
		number: 4,
		value: 0,
	},
	Parameter {
		name: "Movement retries",
		axis: "NA",
		number: 5,
		value: 1,
	},
	Parameter {
		name: "Second x-axis motor",
		axis: "X2",
		number: 36,
		value: 1,
	},
	Parameter {
		name: "Second x-axis motor",
		axis: "X2 invert",
		number: 37,
		value: 1,
	},
];

/// The full parameter table, in the order the suite writes it.
pub fn test_table() -> Vec<Parameter> {
	let mut table = Vec::with_capacity(AXIS_GROUPS.len() * 3 + SINGLE_PARAMETERS.len());
	for &(name, start, value) in AXIS_GROUPS {
		for (offset, axis) in ["x", "y", "z"].into_iter().enumerate() {
			table.push(Parameter {
				name,
				axis,
				number: start + offset as u16,
				value,
			});
		}
	}
	table.extend_from_slice(SINGLE_PARAMETERS);
	table
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn table_shape() {
		let table = test_table();
		assert_eq!(table.len(), 19 * 3 + 4);

		// Axis triples occupy consecutive numbers.
		assert_eq!(table[0].number, 11);
		assert_eq!(table[1].number, 12);
		assert_eq!(table[2].number, 13);
		assert_eq!(table[0].axis, "x");
		assert_eq!(table[2].axis, "z");

		// One-offs land at the end.
		let last = &table[table.len() - 1];
		assert_eq!(last.number, 37);
		assert_eq!(last.axis, "X2 invert");
	}

	#[test]
	fn encoder_settings_enabled_for_movement_tests() {
		let table = test_table();
		let enable_encoders_x = table
			.iter()
			.find(|p| p.number == 101)
			.expect("encoder enable parameter present");
		assert_eq!(enable_encoders_x.value, 1);
	}

	#[test]
	fn numbers_are_unique() {
		let table = test_table();
		let mut numbers: Vec<u16> = table.iter().map(|p| p.number).collect();
		numbers.sort_unstable();
		numbers.dedup();
		assert_eq!(numbers.len(), table.len());
	}
}
