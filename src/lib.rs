//! Exercise FarmBot motion-control electronics over a serial link.
//!
//! The firmware on a [Farmduino or RAMPS/MEGA](board::Board) board speaks a
//! line-oriented ASCII protocol: short command codes such as `F83` or
//! `G00 X200 Y0 Z0` are answered by report lines such as
//! `R82 X200 Y0 Z0 Q0`. This crate builds those [commands](protocol::Command),
//! exchanges them over a [`Port`](port::Port), parses the
//! [reports](protocol::Report) that come back, and scores the observed values
//! against [expectations](expect::Expectation). The [`suite`] module ties it
//! all together into the standard board test suite with verbosity-tiered
//! console output.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(missing_debug_implementations)]

pub mod backend;
pub mod board;
pub mod console;
pub mod error;
pub mod expect;
pub mod params;
pub mod port;
pub mod protocol;
pub mod suite;
pub mod timeout_guard;
