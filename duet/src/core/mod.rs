//! Deterministic interpreter logic.
//!
//! Core modules are free of I/O. They decode programs, execute instructions,
//! and make scheduling decisions on in-memory state only.

pub mod budget;
pub mod channel;
pub mod instruction;
pub mod machine;
pub mod program;
pub mod registers;
pub mod scheduler;
