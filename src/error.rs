//! Error types.
//!
//! Each failure is represented by a unique type that implements
//! [`std::error::Error`]. APIs that can fail in more than one way return the
//! [`Error`] enum, and the concrete types are convertible to it so they can be
//! used with `?`.

use std::io;

/// Implement Error and Display traits for the specified type.
///
/// Define the format string and any arguments it should reference after
/// `self =>` (to abide by macro hygiene rules).
macro_rules! impl_error_display {
	(
		$name:path,
		$self:ident =>
		$display:literal
		$(,
			$($arg:expr),+
		)?
	) => {
		impl std::error::Error for $name {}

		impl std::fmt::Display for $name {
			fn fmt(&$self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
				write!(
					f,
					$display
					$(,
						$($arg),+
					)?
				)
			}
		}
	};
}

/// The specified device is either disconnected or already in use by another process.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SerialDeviceInUseOrDisconnectedError(pub(crate) Box<str>);

impl_error_display! {
	SerialDeviceInUseOrDisconnectedError,
	self =>
	"the specified device is either disconnected or already in use by another process: {}", self.0
}

/// No firmware banner was read from the board after connecting.
///
/// Either the board has no firmware flashed or it is not a board this tool
/// understands.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FirmwareNotDetectedError(());

impl FirmwareNotDetectedError {
	pub(crate) fn new() -> Self {
		FirmwareNotDetectedError(())
	}
}

impl_error_display! {
	FirmwareNotDetectedError,
	self =>
	"firmware error: no firmware detected on the board"
}

/// Any error that can occur while testing a board.
#[derive(Debug)]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum Error {
	SerialDeviceInUseOrDisconnected(SerialDeviceInUseOrDisconnectedError),
	FirmwareNotDetected(FirmwareNotDetectedError),
	Io(io::Error),
}

impl std::error::Error for Error {}

// Defer the display to the inner error type.
impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::SerialDeviceInUseOrDisconnected(e) => e.fmt(f),
			Error::FirmwareNotDetected(e) => e.fmt(f),
			Error::Io(e) => e.fmt(f),
		}
	}
}

impl Error {
	/// A convenience function for determining if the error is due to the
	/// port timing out.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::TimedOut)
	}
}

impl From<SerialDeviceInUseOrDisconnectedError> for Error {
	fn from(other: SerialDeviceInUseOrDisconnectedError) -> Self {
		Error::SerialDeviceInUseOrDisconnected(other)
	}
}

impl From<FirmwareNotDetectedError> for Error {
	fn from(other: FirmwareNotDetectedError) -> Self {
		Error::FirmwareNotDetected(other)
	}
}

impl From<io::Error> for Error {
	fn from(other: io::Error) -> Self {
		Error::Io(other)
	}
}

impl From<serialport::Error> for Error {
	fn from(other: serialport::Error) -> Self {
		match other.kind() {
			serialport::ErrorKind::NoDevice => Error::SerialDeviceInUseOrDisconnected(
				SerialDeviceInUseOrDisconnectedError(other.description.into_boxed_str()),
			),
			serialport::ErrorKind::InvalidInput => Error::Io(io::Error::new(
				io::ErrorKind::InvalidInput,
				other.description,
			)),
			serialport::ErrorKind::Unknown => {
				Error::Io(io::Error::other(other.description))
			}
			serialport::ErrorKind::Io(kind) => {
				Error::Io(io::Error::new(kind, other.description))
			}
		}
	}
}
