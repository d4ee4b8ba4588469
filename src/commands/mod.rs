//! Command handlers invoked by the `repos-update` binary

pub mod run;

pub use run::{execute, handle_command, RunOptions};
