//! The ASCII wire protocol spoken by FarmBot motion-control firmware.
//!
//! Commands are short ASCII tokens such as `F83` or `F41 P13 V1 M0`,
//! terminated by CRLF. The firmware answers with report lines that start with
//! an `R` code, carry whitespace-delimited key-value tokens (`P13`, `V1`,
//! `X200`), and end with a `Q` echo tag: `R41 P13 V1 Q0`. Every command
//! sequence finishes with `R02` (done) or `R03` (error).

mod command;
mod report;

pub use command::{Command, PinMode};
pub use report::Report;
