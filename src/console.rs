//! Verbosity-tiered console output with a transcript.
//!
//! Everything the suite prints also lands in a transcript string so the run
//! can be saved to a results file afterwards, exactly as it appeared on
//! screen.

use std::io::{self, BufRead, Write};
use std::path::Path;

/// How much the suite prints and whether it pauses for confirmation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RunMode {
	/// Full output, prompt before each test.
	FullWithPrompts,
	/// Full output, no prompts.
	Full,
	/// Output only for failed tests, no prompts.
	FailuresOnly,
}

impl RunMode {
	/// Whether every test prints its full sent/received breakdown.
	pub fn verbose(self) -> bool {
		!matches!(self, RunMode::FailuresOnly)
	}

	/// Whether the suite pauses for confirmation before each test.
	pub fn prompts(self) -> bool {
		matches!(self, RunMode::FullWithPrompts)
	}
}

impl std::fmt::Display for RunMode {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			RunMode::FullWithPrompts => write!(f, "1"),
			RunMode::Full => write!(f, "2"),
			RunMode::FailuresOnly => write!(f, "3"),
		}
	}
}

impl std::str::FromStr for RunMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"1" => Ok(RunMode::FullWithPrompts),
			"2" => Ok(RunMode::Full),
			"3" => Ok(RunMode::FailuresOnly),
			other => Err(format!("unknown run mode `{other}` (expected 1, 2, or 3)")),
		}
	}
}

/// Console output that is simultaneously captured into a transcript.
pub struct Console {
	/// The selected run mode.
	mode: RunMode,
	/// Everything printed so far.
	transcript: String,
	/// Where prompt answers are read from.
	input: Box<dyn BufRead>,
}

impl std::fmt::Debug for Console {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Console")
			.field("mode", &self.mode)
			.finish_non_exhaustive()
	}
}

impl Console {
	/// Create a console for the given run mode, answering prompts from
	/// standard input.
	pub fn new(mode: RunMode) -> Console {
		Console::with_input(mode, Box::new(io::stdin().lock()))
	}

	/// Create a console that answers prompts from the given reader instead of
	/// standard input.
	///
	/// Tests script prompt answers this way, the same way port tests script
	/// board responses into a mock backend.
	pub fn with_input(mode: RunMode, input: Box<dyn BufRead>) -> Console {
		Console {
			mode,
			transcript: String::new(),
			input,
		}
	}

	/// The selected run mode.
	pub fn mode(&self) -> RunMode {
		self.mode
	}

	/// Change the run mode.
	///
	/// The run mode is selected interactively after output has already
	/// started, so the console has to be re-configurable.
	pub fn set_mode(&mut self, mode: RunMode) {
		self.mode = mode;
	}

	/// Print a full line.
	pub fn line<S: AsRef<str>>(&mut self, text: S) {
		let text = text.as_ref();
		println!("{text}");
		self.transcript.push_str(text);
		self.transcript.push('\n');
	}

	/// Print an empty line.
	pub fn blank(&mut self) {
		self.line("");
	}

	/// Print a test label.
	///
	/// In the verbose modes the label gets its own line; in failures-only
	/// mode the one-word result is printed right after it on the same line.
	pub fn label(&mut self, text: &str) {
		if self.mode.verbose() {
			self.line(text);
		} else {
			print!("{text}");
			let _ = io::stdout().flush();
			self.transcript.push_str(text);
		}
	}

	/// Print a prompt and read one line of input.
	///
	/// The answer is returned with the line terminator trimmed. Only the
	/// prompt itself is captured in the transcript.
	pub fn prompt(&mut self, text: &str) -> io::Result<String> {
		print!("{text}");
		io::stdout().flush()?;
		self.transcript.push_str(text);
		self.transcript.push('\n');
		let mut answer = String::new();
		self.input.read_line(&mut answer)?;
		Ok(answer.trim_end_matches(['\r', '\n']).to_string())
	}

	/// Everything printed so far.
	pub fn transcript(&self) -> &str {
		&self.transcript
	}

	/// Save the transcript to a file.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
		std::fs::write(path, &self.transcript)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn console(mode: RunMode, answers: &'static str) -> Console {
		Console::with_input(mode, Box::new(io::Cursor::new(answers.as_bytes())))
	}

	#[test]
	fn run_mode_flags() {
		assert!(RunMode::FullWithPrompts.verbose());
		assert!(RunMode::FullWithPrompts.prompts());
		assert!(RunMode::Full.verbose());
		assert!(!RunMode::Full.prompts());
		assert!(!RunMode::FailuresOnly.verbose());
		assert!(!RunMode::FailuresOnly.prompts());
	}

	#[test]
	fn run_mode_from_str() {
		assert_eq!("1".parse::<RunMode>().unwrap(), RunMode::FullWithPrompts);
		assert_eq!("2".parse::<RunMode>().unwrap(), RunMode::Full);
		assert_eq!("3".parse::<RunMode>().unwrap(), RunMode::FailuresOnly);
		assert!("4".parse::<RunMode>().is_err());
	}

	#[test]
	fn transcript_mirrors_output() {
		let mut console = console(RunMode::Full, "");
		console.line("TEST RESULTS");
		console.blank();
		console.label("Turn pin 13 on: ");
		assert_eq!(console.transcript(), "TEST RESULTS\n\nTurn pin 13 on: \n");
	}

	#[test]
	fn labels_stay_on_one_line_in_failures_only_mode() {
		let mut console = console(RunMode::FailuresOnly, "");
		console.label("Turn pin 13 on: ");
		console.line("PASS");
		assert_eq!(console.transcript(), "Turn pin 13 on: PASS\n");
	}

	#[test]
	fn prompt_reads_from_the_input_source() {
		let mut console = console(RunMode::FullWithPrompts, "s\r\n");
		let answer = console.prompt("begin test?").unwrap();
		assert_eq!(answer, "s");
		// Only the prompt itself lands in the transcript.
		assert_eq!(console.transcript(), "begin test?\n");
	}

	#[test]
	fn prompt_at_end_of_input_answers_empty() {
		let mut console = console(RunMode::FullWithPrompts, "");
		assert_eq!(console.prompt("Continue?\n").unwrap(), "");
	}
}
