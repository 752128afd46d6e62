#![deny(clippy::all, clippy::pedantic, clippy::perf, clippy::suspicious)] // Catch correctness + perf + suspicious patterns early.
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Signature registry and call-site checker for `out->message(out, "name", ...)`
//! output-message dispatch.

pub mod check;
pub mod cli;
pub mod collect;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod ir;
pub mod logging;
pub mod registry;
pub mod types;
pub mod version;

pub use driver::MessageCheckDriver;
pub use error::{Error, Result};
