//! Stable exit codes for duet CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Unreadable or malformed program, invalid config, or other I/O failure.
pub const INVALID: i32 = 1;
/// A run aborted on an arithmetic fault (modulo by zero, overflow).
pub const FAULT: i32 = 2;
/// A run exceeded `max_steps`.
pub const STEP_LIMIT: i32 = 3;
/// `duet recover` halted without recovering a frequency.
pub const NOT_RECOVERED: i32 = 4;
