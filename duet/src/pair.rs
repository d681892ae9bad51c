//! Paired runner for `duet pair`.
//!
//! Two machines run the same program with program ids 0 and 1. Every value a
//! machine sends is appended to its peer's inbox before the next step, and the
//! run ends once neither machine can make progress.

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::core::budget::{RunError, StepBudget};
use crate::core::channel::Mailbox;
use crate::core::machine::{ArithmeticError, Machine, Status, Step};
use crate::core::program::Program;
use crate::core::scheduler::{
    MachineId, Schedule, Termination, is_stalled, next_turn, termination,
};

/// Summary of a paired run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairReport {
    /// Values sent by machine 0 and machine 1.
    pub sent: [u64; 2],
    /// Effective steps taken by both machines together.
    pub steps: u64,
    pub statuses: [Status; 2],
    pub termination: Termination,
}

impl PairReport {
    /// Values sent by program id 1.
    pub fn program_one_sent(&self) -> u64 {
        self.sent[1]
    }
}

/// Two machines wired inbox to inbox.
#[derive(Debug, Clone)]
pub struct Pair {
    machines: [Machine<Mailbox>; 2],
}

impl Pair {
    pub fn new(program: &Program) -> Self {
        let machines =
            [0, 1].map(|id| Machine::with_program_id(program.clone(), Mailbox::new(), id));
        Self { machines }
    }

    pub fn machine(&self, id: MachineId) -> &Machine<Mailbox> {
        &self.machines[id.index()]
    }

    /// True if stepping machine `id` would change nothing.
    pub fn is_stalled(&self, id: MachineId) -> bool {
        let machine = self.machine(id);
        is_stalled(machine.status(), machine.channel().is_empty())
    }

    /// How the run ended, or `None` while either machine can still move.
    pub fn termination(&self) -> Option<Termination> {
        termination(
            self.machines
                .each_ref()
                .map(|machine| (machine.status(), machine.channel().is_empty())),
        )
    }

    /// Step machine `id` once and deliver anything it sent to its peer.
    pub fn step(&mut self, id: MachineId) -> Result<Step, ArithmeticError> {
        let machine = &mut self.machines[id.index()];
        if let Some(instruction) = machine.current_instruction() {
            trace!(machine = id.index(), pc = machine.pc(), %instruction, "step");
        }
        let step = machine.step()?;
        if let Some(value) = step.sent {
            self.machines[id.peer().index()].channel_mut().deliver(value);
        }
        Ok(step)
    }

    /// Run until both machines are stalled.
    ///
    /// Stalled machines are skipped rather than stepped, so `max_steps` only
    /// counts steps that can make progress.
    pub fn run(&mut self, schedule: Schedule, max_steps: u64) -> Result<PairReport, RunError> {
        debug!(
            policy = %schedule.policy,
            first = schedule.first_machine().index(),
            max_steps,
            "starting pair run"
        );
        let mut budget = StepBudget::new(max_steps);
        let mut current = schedule.first_machine();

        let termination = loop {
            if let Some(termination) = self.termination() {
                break termination;
            }
            if self.is_stalled(current) {
                current = current.peer();
                continue;
            }
            budget.charge()?;
            self.step(current)?;
            current = next_turn(schedule.policy, current);
        };

        let report = PairReport {
            sent: self.machines.each_ref().map(|machine| machine.sent_count()),
            steps: budget.used(),
            statuses: self.machines.each_ref().map(|machine| machine.status()),
            termination,
        };
        info!(
            termination = ?report.termination,
            sent_0 = report.sent[0],
            sent_1 = report.sent[1],
            steps = report.steps,
            "pair run finished"
        );
        Ok(report)
    }
}

/// Run `program` as a pair and report the result.
pub fn run_pair(
    program: &Program,
    schedule: Schedule,
    max_steps: u64,
) -> Result<PairReport, RunError> {
    Pair::new(program).run(schedule, max_steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instruction::Register;
    use crate::core::scheduler::MachineId::{One, Zero};
    use crate::core::scheduler::Policy;
    use crate::test_support::{PAIR_EXAMPLE, SOUND_EXAMPLE, program};

    const LIMIT: u64 = 10_000;

    fn schedule(policy: Policy, first: usize) -> Schedule {
        Schedule { policy, first }
    }

    fn all_schedules() -> Vec<Schedule> {
        vec![
            schedule(Policy::Alternate, 0),
            schedule(Policy::Alternate, 1),
            schedule(Policy::Burst, 0),
            schedule(Policy::Burst, 1),
        ]
    }

    fn reg(name: char) -> Register {
        Register::new(name).expect("register")
    }

    #[test]
    fn example_program_one_sends_three_then_deadlocks() {
        let report = run_pair(&program(PAIR_EXAMPLE), Schedule::default(), LIMIT).expect("run");
        assert_eq!(report.program_one_sent(), 3);
        assert_eq!(report.termination, Termination::Deadlock);
        assert_eq!(report.statuses, [Status::Waiting, Status::Waiting]);
    }

    #[test]
    fn example_receives_peer_program_id() {
        let mut pair = Pair::new(&program(PAIR_EXAMPLE));
        pair.run(Schedule::default(), LIMIT).expect("run");
        assert_eq!(pair.machine(Zero).registers().get(reg('c')), 1);
        assert_eq!(pair.machine(One).registers().get(reg('c')), 0);
        assert_eq!(pair.machine(Zero).pc(), 6);
        assert_eq!(pair.machine(One).pc(), 6);
    }

    #[test]
    fn result_is_independent_of_fair_schedule() {
        for schedule in all_schedules() {
            let report = run_pair(&program(PAIR_EXAMPLE), schedule, LIMIT).expect("run");
            assert_eq!(report.sent, [3, 3], "{schedule:?}");
            assert_eq!(report.termination, Termination::Deadlock, "{schedule:?}");
        }
    }

    #[test]
    fn no_message_is_lost_or_duplicated() {
        let programs = [
            PAIR_EXAMPLE,
            "snd p",
            "jgz p 2\nsnd 7\nrcv a",
            "set i 4\nsnd i\nadd i -1\njgz i -2\nrcv a\njgz a -1",
        ];
        for text in programs {
            for schedule in all_schedules() {
                let mut pair = Pair::new(&program(text));
                pair.run(schedule, LIMIT).expect("run");
                for id in MachineId::BOTH {
                    let peer_inbox = pair.machine(id.peer()).channel();
                    assert_eq!(
                        peer_inbox.delivered(),
                        pair.machine(id).sent_count(),
                        "{text:?} {schedule:?} machine {id:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn both_halting_is_reported_as_halted() {
        let mut pair = Pair::new(&program("snd p"));
        let report = pair.run(Schedule::default(), LIMIT).expect("run");
        assert_eq!(report.termination, Termination::Halted);
        assert_eq!(report.sent, [1, 1]);
        let pending: Vec<i64> = pair.machine(Zero).channel().pending().collect();
        assert_eq!(pending, vec![1]);
    }

    #[test]
    fn halted_peer_with_starved_waiter_is_mixed() {
        // Machine 0 sends 7 and then waits forever; machine 1 receives it and halts.
        let report =
            run_pair(&program("jgz p 2\nsnd 7\nrcv a"), Schedule::default(), LIMIT).expect("run");
        assert_eq!(report.termination, Termination::Mixed);
        assert_eq!(report.statuses, [Status::Waiting, Status::Halted]);
        assert_eq!(report.sent, [1, 0]);
    }

    #[test]
    fn waiting_machine_resumes_after_delivery() {
        let mut pair = Pair::new(&program("jgz p 3\nset a 0\nsnd 11\nrcv b"));
        // Machine 1 jumps straight to `rcv b` and blocks.
        assert_eq!(pair.step(One).expect("jgz").status, Status::Running);
        assert_eq!(pair.step(One).expect("rcv").status, Status::Waiting);
        assert!(pair.is_stalled(One));
        assert_eq!(pair.machine(One).pc(), 3);
        assert_eq!(pair.machine(One).registers().get(reg('b')), 0);
        assert_eq!(pair.machine(One).executed(), 1);

        pair.step(Zero).expect("jgz");
        pair.step(Zero).expect("set");
        let step = pair.step(Zero).expect("snd");
        assert_eq!(step.sent, Some(11));
        assert!(!pair.is_stalled(One));

        assert_eq!(pair.step(One).expect("rcv").status, Status::Halted);
        assert_eq!(pair.machine(One).registers().get(reg('b')), 11);
        assert_eq!(pair.machine(One).executed(), 2);
    }

    #[test]
    fn inbox_preserves_send_order() {
        let mut pair = Pair::new(&program("snd 1\nsnd 2\nsnd 3\nrcv a\nrcv b\nrcv c"));
        pair.run(Schedule::default(), LIMIT).expect("run");
        let machine = pair.machine(Zero);
        let values: Vec<i64> = ['a', 'b', 'c']
            .into_iter()
            .map(|name| machine.registers().get(reg(name)))
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn sound_example_falls_into_deadlock_in_pair_mode() {
        let report = run_pair(&program(SOUND_EXAMPLE), Schedule::default(), LIMIT).expect("run");
        assert_eq!(report.sent, [1, 1]);
        assert_eq!(report.termination, Termination::Deadlock);
    }

    #[test]
    fn modulo_by_zero_aborts_run() {
        let err = run_pair(&program("mod p 0"), Schedule::default(), LIMIT).unwrap_err();
        assert!(matches!(
            err,
            RunError::Arithmetic(ArithmeticError::ModuloByZero { pc: 0, .. })
        ));
    }

    #[test]
    fn endless_loop_hits_step_limit() {
        let err = run_pair(&program("snd 1\njgz 1 -1"), Schedule::default(), 64).unwrap_err();
        assert_eq!(err, RunError::StepLimit { limit: 64 });
    }
}
