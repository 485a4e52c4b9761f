//! A "scope guard" that will reset a port's timeout when it goes out of scope.

use crate::backend::Backend;
use crate::port::Port;
use std::{io, time::Duration};

/// A "scope guard" that will update the port's read timeout and then reset it
/// when it goes out of scope.
///
/// To create a guard, use the port's
/// [`timeout_guard`](crate::port::Port::timeout_guard) method.
///
/// While the guard is in scope, the port can only be accessed through the
/// guard. However, because the guard implements [`Deref`](std::ops::Deref) and
/// [`DerefMut`](std::ops::DerefMut) callers can treat the guard as the port.
///
/// If the original timeout cannot be restored when the guard is dropped, the
/// port is poisoned: the restoration error is reported by the next attempt to
/// communicate over the port.
#[derive(Debug)]
pub struct TimeoutGuard<'a, B: Backend> {
	/// The underlying port.
	port: &'a mut Port<B>,
	/// The original timeout that will be restored when the guard is dropped.
	original_timeout: Option<Duration>,
}

impl<'a, B: Backend> TimeoutGuard<'a, B> {
	/// Update the port's timeout and return a [`TimeoutGuard`] wrapping the port.
	pub(crate) fn new(port: &'a mut Port<B>, timeout: Option<Duration>) -> Result<Self, io::Error> {
		let backend = port.backend_mut();
		let original_timeout = backend.read_timeout()?;
		backend.set_read_timeout(timeout)?;
		Ok(TimeoutGuard {
			port,
			original_timeout,
		})
	}
}

impl<'a, B: Backend> std::ops::Deref for TimeoutGuard<'a, B> {
	type Target = Port<B>;
	/// Get a shared reference to the underlying port.
	fn deref(&self) -> &Self::Target {
		self.port
	}
}

impl<'a, B: Backend> std::ops::DerefMut for TimeoutGuard<'a, B> {
	/// Get an exclusive reference to the underlying port.
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.port
	}
}

impl<'a, B: Backend> Drop for TimeoutGuard<'a, B> {
	fn drop(&mut self) {
		if let Err(err) = self
			.port
			.backend_mut()
			.set_read_timeout(self.original_timeout)
		{
			self.port.poison(io::Error::other(
				if let Some(timeout) = self.original_timeout {
					format!(
						"failed to reset timeout to {} ms: {}",
						timeout.as_millis(),
						err
					)
				} else {
					format!("failed to reset to an infinite timeout: {err}")
				},
			));
		}
	}
}
