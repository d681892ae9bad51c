//! Test-only fixtures: example programs and temp-dir helpers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::program::Program;

/// Single-machine example; recovers frequency 4.
pub const SOUND_EXAMPLE: &str = "set a 1
add a 2
mul a a
mod a 5
snd a
set a 0
rcv a
jgz a -1
set a 1
jgz a -2
";

/// Paired example; program 1 sends three values before both deadlock.
pub const PAIR_EXAMPLE: &str = "snd 1
snd 2
snd p
rcv a
rcv b
rcv c
rcv d
";

/// Decode a fixture program, panicking on malformed text.
pub fn program(text: &str) -> Program {
    Program::parse(text).expect("fixture program")
}

/// Write `text` to `dir/name` and return the full path.
pub fn write_program(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write program fixture");
    path
}
