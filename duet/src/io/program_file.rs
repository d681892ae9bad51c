//! Loading programs from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::program::Program;

/// Read and decode a program file.
pub fn load_program(path: &Path) -> Result<Program> {
    debug!(path = %path.display(), "loading program");
    let text =
        fs::read_to_string(path).with_context(|| format!("read program {}", path.display()))?;
    let program =
        Program::parse(&text).with_context(|| format!("parse program {}", path.display()))?;
    debug!(instructions = program.len(), "program loaded");
    Ok(program)
}
