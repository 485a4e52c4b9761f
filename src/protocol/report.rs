//! Parsing of firmware report lines.

/// A single parsed report line, e.g. `R41 P13 V1 Q0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Report {
	/// The raw line, without the line terminator.
	raw: String,
	/// The report code, e.g. `R41`.
	marker: String,
	/// The value tokens, joined by single spaces, e.g. `P13 V1`.
	values: String,
}

impl Report {
	/// Parse a single report line.
	///
	/// Returns `None` if the line does not start with an `R` code. The value
	/// tokens are everything after the code, minus the trailing `Q` echo tag
	/// the firmware appends.
	pub fn parse(line: &str) -> Option<Report> {
		let line = line.trim();
		let mut tokens: Vec<&str> = line.split_whitespace().collect();
		let marker = match tokens.first() {
			Some(first) if first.starts_with('R') => first.to_string(),
			_ => return None,
		};
		if matches!(tokens.last(), Some(last) if last.starts_with('Q')) {
			tokens.pop();
		}
		Some(Report {
			raw: line.to_string(),
			marker,
			values: tokens[1..].join(" "),
		})
	}

	/// The raw report line as received, without the line terminator.
	pub fn raw(&self) -> &str {
		&self.raw
	}

	/// The report code, e.g. `R41`.
	pub fn marker(&self) -> &str {
		&self.marker
	}

	/// The value tokens, e.g. `P13 V1` for the line `R41 P13 V1 Q0`.
	pub fn values(&self) -> &str {
		&self.values
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn parse_pin_report() {
		let report = Report::parse("R41 P13 V1 Q0").unwrap();
		assert_eq!(report.marker(), "R41");
		assert_eq!(report.values(), "P13 V1");
		assert_eq!(report.raw(), "R41 P13 V1 Q0");
	}

	#[test]
	fn parse_position_report() {
		let report = Report::parse("R82 X200 Y0 Z0 Q0").unwrap();
		assert_eq!(report.marker(), "R82");
		assert_eq!(report.values(), "X200 Y0 Z0");
	}

	#[test]
	fn parse_without_echo_tag() {
		// Startup reports are not echoes of a command and carry no Q tag.
		let report = Report::parse("R88").unwrap();
		assert_eq!(report.marker(), "R88");
		assert_eq!(report.values(), "");

		let report = Report::parse("R99 ARDUINO STARTUP COMPLETE").unwrap();
		assert_eq!(report.values(), "ARDUINO STARTUP COMPLETE");
	}

	#[test]
	fn parse_rejects_non_reports() {
		assert_eq!(Report::parse(""), None);
		assert_eq!(Report::parse("F83"), None);
		assert_eq!(Report::parse("garbage line"), None);
	}
}
