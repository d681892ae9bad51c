//! Interpreter for duet assembly.
//!
//! A duet program is a list of `snd/set/add/mul/mod/rcv/jgz` instructions over
//! single-letter registers. It runs in one of two modes:
//!
//! - **sound** ([`recover`]): one machine; `snd` plays a frequency and `rcv`
//!   recovers the last one played.
//! - **paired** ([`pair`]): two machines with program ids 0 and 1 exchange
//!   values through FIFO inboxes until both halt or deadlock.
//!
//! The crate keeps a strict split:
//!
//! - **[`core`]**: pure, deterministic logic (decoding, execution,
//!   scheduling). No I/O.
//! - **[`io`]**: filesystem side effects (program files, config).

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pair;
pub mod recover;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
