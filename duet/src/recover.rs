//! Sound-variant runner for `duet recover`.

use serde::Serialize;
use tracing::{info, trace};

use crate::core::budget::{RunError, StepBudget};
use crate::core::channel::SoundCard;
use crate::core::machine::{Machine, Status};
use crate::core::program::Program;

/// Result of a sound-variant run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Recovery {
    /// A `rcv` fired on a nonzero register after at least one sound.
    Recovered { frequency: i64, steps: u64 },
    /// The program ran off either end before anything was recovered.
    Halted { last_played: Option<i64>, steps: u64 },
}

/// Run a single machine until the first recovered frequency.
///
/// The run stops on the step that recovers, not when the program ends.
pub fn run_recover(program: &Program, max_steps: u64) -> Result<Recovery, RunError> {
    let mut machine = Machine::new(program.clone(), SoundCard::new());
    let mut budget = StepBudget::new(max_steps);

    loop {
        if let Some(frequency) = machine.channel().recovered() {
            info!(frequency, steps = budget.used(), "frequency recovered");
            return Ok(Recovery::Recovered {
                frequency,
                steps: budget.used(),
            });
        }
        if machine.status() == Status::Halted {
            let last_played = machine.channel().last_played();
            info!(?last_played, steps = budget.used(), "program halted before recovery");
            return Ok(Recovery::Halted {
                last_played,
                steps: budget.used(),
            });
        }

        budget.charge()?;
        if let Some(instruction) = machine.current_instruction() {
            trace!(pc = machine.pc(), %instruction, "step");
        }
        machine.step()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::machine::ArithmeticError;
    use crate::test_support::{SOUND_EXAMPLE, program};

    #[test]
    fn example_recovers_four() {
        let outcome = run_recover(&program(SOUND_EXAMPLE), 1_000).expect("run");
        assert!(matches!(outcome, Recovery::Recovered { frequency: 4, .. }));
    }

    #[test]
    fn example_stops_at_first_recovery() {
        // set, add, mul, mod, snd, set, rcv, jgz, set, jgz(-2), jgz(-1), rcv
        let outcome = run_recover(&program(SOUND_EXAMPLE), 1_000).expect("run");
        assert_eq!(
            outcome,
            Recovery::Recovered {
                frequency: 4,
                steps: 12,
            }
        );
    }

    #[test]
    fn zero_register_rcv_is_skipped() {
        let outcome = run_recover(&program("snd 3\nset a 0\nrcv a"), 100).expect("run");
        assert_eq!(
            outcome,
            Recovery::Halted {
                last_played: Some(3),
                steps: 3,
            }
        );
    }

    #[test]
    fn rcv_before_any_sound_keeps_running() {
        let outcome =
            run_recover(&program("set a 1\nrcv a\nsnd 9\nrcv a\nsnd 5"), 100).expect("run");
        assert_eq!(
            outcome,
            Recovery::Recovered {
                frequency: 9,
                steps: 4,
            }
        );
    }

    #[test]
    fn recovery_on_last_instruction_wins_over_halt() {
        let outcome = run_recover(&program("snd 2\nset a 1\nrcv a"), 100).expect("run");
        assert!(matches!(outcome, Recovery::Recovered { frequency: 2, .. }));
    }

    #[test]
    fn modulo_by_zero_aborts() {
        let err = run_recover(&program("set x 4\nmod x y\nsnd x"), 100).unwrap_err();
        assert!(matches!(
            err,
            RunError::Arithmetic(ArithmeticError::ModuloByZero { pc: 1, .. })
        ));
    }

    #[test]
    fn endless_loop_hits_step_limit() {
        let err = run_recover(&program("jgz 1 0"), 50).unwrap_err();
        assert_eq!(err, RunError::StepLimit { limit: 50 });
    }
}
