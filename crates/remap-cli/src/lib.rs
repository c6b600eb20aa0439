//! Library components of the `sheet-remap` command line tool.

pub mod advisor;
pub mod logging;
pub mod pipeline;
pub mod settings;
