//! Contend benchmark front end
//!
//! Command-line parsing, logging setup and the renderers that turn
//! [`contend_core::TestReport`]s into text, CSV or JSON.

pub mod cli;
pub mod logging;
pub mod render;
