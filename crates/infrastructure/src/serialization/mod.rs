//! JSON helpers for the settings file and command output.
//!
//! Output is pretty-printed with 2-space indentation and a trailing
//! newline, so settings files diff cleanly.

mod json;

pub use json::*;
