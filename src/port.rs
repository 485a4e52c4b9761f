//! Types for opening and using a serial port with the firmware's line protocol.

mod options;
#[cfg(test)]
mod test;

use crate::backend::{Backend, Serial, UNKNOWN_BACKEND_NAME};
use crate::error::Error;
use crate::protocol::{Command, Report};
use crate::timeout_guard::TimeoutGuard;
pub use options::OpenSerialOptions;
use std::{
	io::{self},
	time::{Duration, Instant},
};

/// How long a single backend read blocks before the read loop re-checks its
/// deadline.
pub(crate) const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// The token that ends an exchange.
///
/// The firmware reports asynchronously, so the reader must know which token
/// marks the end of the traffic it is waiting for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Until {
	/// `R02` (command done) or `R03` (command error).
	Completion,
	/// `R00`: the firmware is idle.
	Idle,
	/// `R82 X0 Y0 Z0`: the position report confirming all axes are at zero.
	Home,
}

impl Until {
	/// Whether the accumulated traffic contains this terminal token.
	fn matched(self, traffic: &str) -> bool {
		match self {
			Until::Completion => traffic.contains("R02") || traffic.contains("R03"),
			Until::Idle => traffic.contains("R00"),
			Until::Home => traffic.contains("R82 X0 Y0 Z0"),
		}
	}
}

/// Everything read back during one exchange with the firmware.
///
/// An exchange that hit its response deadline is not an error: the suite
/// scores whatever did arrive, which is how a dead motor driver or a missing
/// jumper shows up as a FAIL rather than aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
	/// The raw traffic, CRLF terminators included.
	raw: String,
	/// Whether the response deadline expired before a terminal token arrived.
	timed_out: bool,
}

impl Exchange {
	/// The raw traffic, CRLF terminators included.
	pub fn raw(&self) -> &str {
		&self.raw
	}

	/// Whether the response deadline expired before a terminal token arrived.
	pub fn timed_out(&self) -> bool {
		self.timed_out
	}

	/// Find the report line carrying the given code.
	///
	/// Only complete lines (terminated by CRLF) are considered, and the most
	/// recent matching line wins: the firmware repeats position reports while
	/// it moves, and only the last one reflects where it stopped.
	pub fn report_for(&self, marker: &str) -> Option<Report> {
		let complete = &self.raw[..self.raw.rfind("\r\n")?];
		complete
			.rsplit("\r\n")
			.find(|line| line.contains(marker))
			.and_then(Report::parse)
	}
}

/// A port configured for the firmware's line protocol.
///
/// A `Port` is parameterized by the type of [`Backend`] used to exchange
/// bytes. Use [`open_serial`](Port::open_serial) to construct a serial port
/// (`Port<Serial>`), or [`open_serial_options`](Port::open_serial_options) to
/// customize its construction.
pub struct Port<B> {
	/// The underlying backend.
	backend: B,
	/// How long to wait for a terminal report after sending a command.
	response_timeout: Duration,
	/// If populated, the error that has "poisoned" the port. This error MUST
	/// be reported before the port is used for communication again.
	///
	/// A port becomes "poisoned" when an error occurs that cannot be recovered
	/// from, panicking is ill advised, and it is safe to delay reporting of
	/// the error until the next attempt to communicate over the port. For
	/// instance, if a [`TimeoutGuard`] cannot restore the original timeout in
	/// its Drop implementation, rather than panicking it poisons the port.
	poison: Option<io::Error>,
}

impl<B: Backend> std::fmt::Debug for Port<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Port")
			.field("name", &self.backend.name())
			.finish_non_exhaustive()
	}
}

impl Port<Serial> {
	/// Open the serial port at the specified path using the default options.
	///
	/// Alternatively, use [`Port::open_serial_options`] to customize how the
	/// port is opened.
	///
	/// ## Example
	///
	/// ```rust
	/// # use farmduino_test::port::Port;
	/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
	/// let mut port = Port::open_serial("/dev/ttyACM0")?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn open_serial(path: &str) -> Result<Port<Serial>, Error> {
		OpenSerialOptions::new().open(path)
	}

	/// Get an [`OpenSerialOptions`] to customize how a serial port is opened.
	pub fn open_serial_options() -> OpenSerialOptions {
		OpenSerialOptions::default()
	}
}

#[cfg(any(test, feature = "mock"))]
impl Port<crate::backend::Mock> {
	/// Open a port over a [`Mock`](crate::backend::Mock) backend with a short
	/// response deadline, for use in tests.
	pub fn open_mock() -> Port<crate::backend::Mock> {
		Port::from_backend(crate::backend::Mock::new(), Duration::from_millis(10))
	}

	/// Access the mock backend, to script its responses.
	pub fn mock_mut(&mut self) -> &mut crate::backend::Mock {
		&mut self.backend
	}
}

impl<B: Backend> Port<B> {
	/// Create a `Port` from a [`Backend`] type.
	fn from_backend(backend: B, response_timeout: Duration) -> Self {
		Port {
			backend,
			response_timeout,
			poison: None,
		}
	}

	/// Check if the port is poisoned and report the error if it exists.
	fn check_poisoned(&mut self) -> Result<(), io::Error> {
		if let Some(poison) = self.poison.take() {
			Err(poison)
		} else {
			Ok(())
		}
	}

	/// Poison the port with the given error.
	pub(crate) fn poison(&mut self, e: io::Error) {
		self.poison = Some(e);
	}

	/// Get the underlying backend.
	pub(crate) fn backend_mut(&mut self) -> &mut B {
		&mut self.backend
	}

	/// The "name" of the port's backend.
	///
	/// This is often the path to the serial port.
	pub fn name(&self) -> Option<String> {
		self.backend.name()
	}

	/// The log-friendly name of the port's backend.
	fn display_name(&self) -> String {
		self.backend
			.name()
			.unwrap_or_else(|| UNKNOWN_BACKEND_NAME.to_string())
	}

	/// Temporarily change the port's read timeout.
	///
	/// The original timeout is restored when the returned guard goes out of
	/// scope.
	pub fn timeout_guard(
		&mut self,
		timeout: Option<Duration>,
	) -> Result<TimeoutGuard<'_, B>, io::Error> {
		self.check_poisoned()?;
		TimeoutGuard::new(self, timeout)
	}

	/// Read and discard whatever the firmware has already sent.
	///
	/// Returns the discarded traffic, which the caller may still want to
	/// inspect (the startup banner check does).
	pub fn drain(&mut self) -> Result<String, Error> {
		self.check_poisoned()?;
		let mut bytes = Vec::new();
		{
			let mut guard = TimeoutGuard::new(self, Some(Duration::from_millis(1)))?;
			let mut chunk = [0u8; 256];
			loop {
				match guard.backend.read(&mut chunk) {
					Ok(0) => break,
					Ok(n) => bytes.extend_from_slice(&chunk[..n]),
					Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
					Err(e) => return Err(e.into()),
				}
			}
		}
		let discarded = String::from_utf8_lossy(&bytes).into_owned();
		if !discarded.is_empty() {
			log::debug!("{} drained: {}", self.display_name(), discarded.trim_end());
		}
		Ok(discarded)
	}

	/// Send a command. No response is read.
	pub fn send(&mut self, cmd: &Command) -> Result<(), Error> {
		self.check_poisoned()?;
		let mut buffer = Vec::with_capacity(cmd.data().len() + 2);
		cmd.write_into(&mut buffer)?;
		log::debug!("{} TX: {}", self.display_name(), cmd.data());
		self.backend.write_all(&buffer)?;
		Ok(())
	}

	/// Read traffic until the given terminal token arrives or the response
	/// deadline expires.
	pub fn read_until(&mut self, until: Until) -> Result<Exchange, Error> {
		self.check_poisoned()?;
		let deadline = Instant::now() + self.response_timeout;
		let mut bytes = Vec::new();
		let mut chunk = [0u8; 256];
		let mut timed_out = false;
		loop {
			match self.backend.read(&mut chunk) {
				Ok(0) => {}
				Ok(n) => bytes.extend_from_slice(&chunk[..n]),
				Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
				Err(e) => return Err(e.into()),
			}
			let traffic = String::from_utf8_lossy(&bytes);
			if until.matched(&traffic) {
				break;
			}
			if Instant::now() >= deadline {
				timed_out = true;
				log::warn!(
					"{} response deadline expired waiting for {until:?}",
					self.display_name()
				);
				break;
			}
		}
		let raw = String::from_utf8_lossy(&bytes).into_owned();
		if !raw.is_empty() {
			log::debug!("{} RX: {}", self.display_name(), raw.trim_end());
		}
		Ok(Exchange { raw, timed_out })
	}

	/// Discard stale traffic, send a command, and read until the command
	/// completes (`R02`/`R03`) or the response deadline expires.
	pub fn request(&mut self, cmd: &Command) -> Result<Exchange, Error> {
		self.check_poisoned()?;
		self.backend.discard_input()?;
		self.send(cmd)?;
		self.read_until(Until::Completion)
	}

	/// Wait for the firmware to report that it is idle.
	pub fn wait_for_idle(&mut self) -> Result<Exchange, Error> {
		self.read_until(Until::Idle)
	}

	/// Wait for the firmware to report the home position.
	pub fn wait_for_home(&mut self) -> Result<Exchange, Error> {
		self.read_until(Until::Home)
	}
}
