//! Types defining the different options when opening a port.

use super::{Port, POLL_TIMEOUT};
use crate::{backend::Serial, error::Error};
use serialport as sp;
use std::time::Duration;

/// Options for configuring and opening a serial port.
///
/// ## Example
///
/// ```rust
/// # use farmduino_test::port::OpenSerialOptions;
/// # use std::time::Duration;
/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let mut port = OpenSerialOptions::new()
///     .baud_rate(115_200)
///     .response_timeout(Duration::from_secs(10))
///     .open("/dev/ttyACM0")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenSerialOptions {
	/// The custom baud rate.
	baud_rate: u32,
	/// How long to wait for a command's terminal report.
	response_timeout: Duration,
}

impl OpenSerialOptions {
	/// The default baud rate the firmware listens at: 115,200.
	pub const DEFAULT_BAUD_RATE: u32 = 115_200;

	/// The default response deadline: 6 seconds.
	///
	/// Long enough for a 200 step move at the suite's speed settings.
	pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(6);

	/// Create a blank set of options ready for configuration.
	///
	/// The default baud rate and response deadline are 115,200 and 6 seconds,
	/// respectively.
	///
	/// Equivalent to [`default`](OpenSerialOptions::default).
	pub fn new() -> Self {
		OpenSerialOptions {
			baud_rate: OpenSerialOptions::DEFAULT_BAUD_RATE,
			response_timeout: OpenSerialOptions::DEFAULT_RESPONSE_TIMEOUT,
		}
	}

	/// Set a custom baud rate.
	///
	/// The default is 115,200.
	pub fn baud_rate(&mut self, baud_rate: u32) -> &mut Self {
		self.baud_rate = baud_rate;
		self
	}

	/// Set a custom response deadline.
	///
	/// This bounds how long [`Port`](super::Port) methods wait for a terminal
	/// report before giving up on the exchange. The default is 6 seconds.
	pub fn response_timeout(&mut self, duration: Duration) -> &mut Self {
		self.response_timeout = duration;
		self
	}

	/// Open a [`Serial`] backend configured for the firmware's line protocol
	/// at the specified path.
	fn open_serial_port(&self, path: &str) -> Result<Serial, Error> {
		// Due to https://gitlab.com/susurrus/serialport-rs/-/issues/102, the
		// baud rate passed to new is ignored. It must be defined using the
		// baud_rate method below. Use the default baud_rate as it should be a
		// valid baud rate.
		sp::new(path, OpenSerialOptions::DEFAULT_BAUD_RATE)
			.data_bits(sp::DataBits::Eight)
			.parity(sp::Parity::None)
			.flow_control(sp::FlowControl::None)
			.stop_bits(sp::StopBits::One)
			// The read timeout is the polling interval, not the response
			// deadline; Port methods keep reading until their deadline.
			.timeout(POLL_TIMEOUT)
			.baud_rate(self.baud_rate)
			.open_native()
			.map(Serial)
			.map_err(Into::into)
	}

	/// Open the port at the specified path with the custom options.
	pub fn open(&self, path: &str) -> Result<Port<Serial>, Error> {
		Ok(Port::from_backend(
			self.open_serial_port(path)?,
			self.response_timeout,
		))
	}
}

impl Default for OpenSerialOptions {
	fn default() -> Self {
		OpenSerialOptions::new()
	}
}
