//! CLI subcommands.

pub mod batch;
pub mod policy;
pub mod run;
