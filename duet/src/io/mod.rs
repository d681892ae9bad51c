//! I/O helpers for duet commands.

pub mod config;
pub mod program_file;
