//! Scoring of observed report values against expected values.

/// How far an observed step count may drift from the expected count before a
/// position comparison fails. Encoder readings are scaled to steps by the
/// firmware but rarely land exactly.
pub const POSITION_TOLERANCE: i64 = 5;

/// How the expected value is compared to the observed value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum Kind {
	/// Byte-for-byte equality of the value tokens.
	Exact,
	/// Compare the integer after `V` using the operator embedded in the
	/// expected text, e.g. `P59 V>1000`.
	Analog,
	/// Per-axis comparison of `X`/`Y`/`Z` step counts within
	/// [`POSITION_TOLERANCE`].
	Position,
}

/// An expected value for one test case, e.g. `P13 V1` or `X200 Y0 Z0`.
///
/// The comparison style is inferred from the expected text the same way a
/// technician reads it: an embedded `<`, `>`, or `=` means an operator
/// comparison on the `V` field, the presence of all of `X`, `Y`, and `Z`
/// means a position comparison with tolerance, and anything else must match
/// exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expectation {
	text: String,
	kind: Kind,
}

impl Expectation {
	/// Create an expectation from its textual form.
	pub fn new<T: Into<String>>(text: T) -> Expectation {
		let text = text.into();
		let kind = if text.contains(['<', '>', '=']) {
			Kind::Analog
		} else if ['X', 'Y', 'Z'].iter().all(|axis| text.contains(*axis)) {
			Kind::Position
		} else {
			Kind::Exact
		};
		Expectation { text, kind }
	}

	/// The textual form of the expectation, for reporting.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Check the observed value tokens against this expectation.
	///
	/// `None` (no report line was received) always fails.
	pub fn check(&self, observed: Option<&str>) -> bool {
		let observed = match observed {
			Some(observed) => observed,
			None => return false,
		};
		match self.kind {
			Kind::Exact => observed == self.text,
			Kind::Analog => self.check_analog(observed),
			Kind::Position => self.check_position(observed),
		}
	}

	/// Compare using the provided operator (for analog pin reads).
	///
	/// The expected text carries the operator and limit after its `V`, e.g.
	/// `>1000` in `P59 V>1000`; the observed tokens carry the reading, e.g.
	/// `P59 V1023`.
	fn check_analog(&self, observed: &str) -> bool {
		let expected = match self.text.rsplit('V').next() {
			Some(expected) if !expected.is_empty() => expected,
			_ => return false,
		};
		let (op, limit) = expected.split_at(1);
		let limit: i64 = match limit.trim().parse() {
			Ok(limit) => limit,
			Err(_) => return false,
		};
		let actual: i64 = match observed.rsplit('V').next().map(str::trim).map(str::parse) {
			Some(Ok(actual)) => actual,
			_ => return false,
		};
		match op {
			">" => actual > limit,
			"<" => actual < limit,
			"=" => actual == limit,
			_ => false,
		}
	}

	/// Compare the difference in step counts (for position and encoder
	/// readings).
	///
	/// Observed counts may be fractional (encoder readings scaled to steps);
	/// they are truncated before comparison.
	fn check_position(&self, observed: &str) -> bool {
		let expected: Vec<&str> = self.text.split_whitespace().collect();
		let observed: Vec<&str> = observed.split_whitespace().collect();
		if expected.len() < 3 || observed.len() < 3 {
			return false;
		}
		for (want, got) in expected.iter().zip(observed.iter()).take(3) {
			let want: i64 = match want[1..].parse() {
				Ok(want) => want,
				Err(_) => return false,
			};
			let got: i64 = match got[1..].parse::<f64>() {
				Ok(got) => got as i64,
				Err(_) => return false,
			};
			if (got - want).abs() > POSITION_TOLERANCE {
				return false;
			}
		}
		true
	}
}

impl std::fmt::Display for Expectation {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}", self.text)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn exact() {
		let expect = Expectation::new("P13 V1");
		assert!(expect.check(Some("P13 V1")));
		assert!(!expect.check(Some("P13 V0")));
		assert!(!expect.check(None));
	}

	#[test]
	fn analog_greater_than() {
		let expect = Expectation::new("P59 V>1000");
		assert!(expect.check(Some("P59 V1023")));
		assert!(!expect.check(Some("P59 V1000")));
		assert!(!expect.check(Some("P59 V64")));
		assert!(!expect.check(Some("garbage")));
	}

	#[test]
	fn analog_less_than_and_equal() {
		assert!(Expectation::new("P59 V<100").check(Some("P59 V22")));
		assert!(!Expectation::new("P59 V<100").check(Some("P59 V100")));
		assert!(Expectation::new("P63 V=1").check(Some("P63 V1")));
		assert!(!Expectation::new("P63 V=1").check(Some("P63 V0")));
	}

	#[test]
	fn position_within_tolerance() {
		let expect = Expectation::new("X200 Y0 Z0");
		assert!(expect.check(Some("X200 Y0 Z0")));
		// Encoder readings come back scaled and fractional.
		assert!(expect.check(Some("X198.5 Y3 Z-4")));
		assert!(!expect.check(Some("X206 Y0 Z0")));
		assert!(!expect.check(Some("X200 Y0")));
	}

	#[test]
	fn home_position_is_positional() {
		// `X0 Y0 Z0` must tolerate drift too, not require equality.
		let expect = Expectation::new("X0 Y0 Z0");
		assert!(expect.check(Some("X-2 Y1 Z0")));
		assert!(!expect.check(Some("X-12 Y1 Z0")));
	}
}
