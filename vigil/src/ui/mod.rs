//! Terminal output helpers.
//!
//! - [`table`]: tabular rendering of configuration data.
//! - [`WaitSpinner`]: a spinner shown while waiting on a workload.

pub mod table;
mod wait_spinner;

pub use self::wait_spinner::WaitSpinner;
