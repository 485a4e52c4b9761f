use crate::error::Error;
use crate::port::{Port, Until};
use crate::protocol::Command;
use std::io;
use std::time::Duration;

#[test]
fn request_reads_until_completion() {
	let mut port = Port::open_mock();
	{
		let backend = port.mock_mut();
		backend.push(b"R01 Q0\r\n");
		backend.push(b"R41 P13 V1 Q0\r\n");
		backend.push(b"R02 Q0\r\n");
	}
	let exchange = port
		.request(&Command::read_pin(13, crate::protocol::PinMode::Digital))
		.unwrap();
	assert!(!exchange.timed_out());

	let report = exchange.report_for("R41").unwrap();
	assert_eq!(report.values(), "P13 V1");
	assert_eq!(exchange.report_for("R84"), None);
}

#[test]
fn request_stops_on_command_error_report() {
	let mut port = Port::open_mock();
	port.mock_mut().push(b"R03 Q0\r\n");
	let exchange = port.request(&Command::firmware_version()).unwrap();
	assert!(!exchange.timed_out());
	assert_eq!(exchange.report_for("R83"), None);
}

#[test]
fn request_flags_deadline_expiry() {
	let mut port = Port::open_mock();
	// A lone position report with no completion report behind it.
	port.mock_mut().push(b"R82 X200 Y0 Z0 Q0\r\n");
	let exchange = port.request(&Command::move_to(200, 0, 0)).unwrap();
	assert!(exchange.timed_out());
	// The traffic that did arrive is still scorable.
	let report = exchange.report_for("R82").unwrap();
	assert_eq!(report.values(), "X200 Y0 Z0");
}

#[test]
fn report_for_ignores_incomplete_lines() {
	let mut port = Port::open_mock();
	{
		let backend = port.mock_mut();
		backend.push(b"R82 X0 Y0 Z0 Q0\r\n");
		// The board went quiet mid-line; no completion report follows.
		backend.push(b"R82 X9");
	}
	let exchange = port.read_until(Until::Completion).unwrap();
	assert!(exchange.timed_out());
	let report = exchange.report_for("R82").unwrap();
	assert_eq!(report.values(), "X0 Y0 Z0");
}

#[test]
fn report_for_prefers_the_last_match() {
	let mut port = Port::open_mock();
	{
		let backend = port.mock_mut();
		backend.push(b"R82 X50 Y0 Z0 Q0\r\n");
		backend.push(b"R82 X200 Y0 Z0 Q0\r\n");
		backend.push(b"R02 Q0\r\n");
	}
	let exchange = port.read_until(Until::Completion).unwrap();
	let report = exchange.report_for("R82").unwrap();
	assert_eq!(report.values(), "X200 Y0 Z0");
}

#[test]
fn wait_for_home() {
	let mut port = Port::open_mock();
	{
		let backend = port.mock_mut();
		backend.push(b"R82 X120 Y0 Z0 Q0\r\n");
		backend.push(b"R82 X0 Y0 Z0 Q0\r\n");
	}
	let exchange = port.wait_for_home().unwrap();
	assert!(!exchange.timed_out());
	assert!(exchange.raw().contains("R82 X0 Y0 Z0"));
}

#[test]
fn wait_for_idle() {
	let mut port = Port::open_mock();
	port.mock_mut().push(b"R00 Q0\r\n");
	let exchange = port.wait_for_idle().unwrap();
	assert!(!exchange.timed_out());
}

#[test]
fn drain_returns_and_discards_stale_traffic() {
	let mut port = Port::open_mock();
	port.mock_mut().push(b"R99 ARDUINO STARTUP COMPLETE\r\n");
	let drained = port.drain().unwrap();
	assert!(drained.contains('R'));
	assert_eq!(port.drain().unwrap(), "");
}

#[test]
fn send_surfaces_write_errors() {
	let mut port = Port::open_mock();
	port.mock_mut()
		.write_error(Some(io::Error::new(io::ErrorKind::BrokenPipe, "gone")));
	let err = port.send(&Command::firmware_version()).unwrap_err();
	assert!(matches!(err, Error::Io(_)));
}

#[test]
fn failed_timeout_restoration_poisons_the_port() {
	let mut port = Port::open_mock();
	{
		let mut guard = port.timeout_guard(Some(Duration::from_millis(1))).unwrap();
		guard
			.mock_mut()
			.set_read_timeout_error(Some(io::Error::other("cannot restore")));
	}
	// The restoration failure surfaces on the next use of the port.
	let err = port.drain().unwrap_err();
	assert!(matches!(err, Error::Io(_)));
	// And only once.
	assert!(port.drain().is_ok());
}
