//! Pure scheduling decisions for paired machines.
//!
//! Nothing here touches a machine directly: every decision is a function of
//! statuses and inbox emptiness, so it can be tested in isolation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::machine::Status;

/// Order in which live machines are offered steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// One step per machine, taking turns.
    #[default]
    Alternate,
    /// Keep stepping one machine until it stalls, then switch.
    Burst,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Alternate => f.write_str("alternate"),
            Policy::Burst => f.write_str("burst"),
        }
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alternate" => Ok(Policy::Alternate),
            "burst" => Ok(Policy::Burst),
            other => Err(format!(
                "unknown policy `{other}` (expected `alternate` or `burst`)"
            )),
        }
    }
}

/// Scheduling settings for a paired run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub policy: Policy,
    /// Machine offered the first step. Any nonzero value means machine 1.
    pub first: usize,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            policy: Policy::Alternate,
            first: 0,
        }
    }
}

impl Schedule {
    pub(crate) fn first_machine(&self) -> MachineId {
        if self.first == 0 {
            MachineId::Zero
        } else {
            MachineId::One
        }
    }
}

/// One of the two machines in a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineId {
    Zero,
    One,
}

impl MachineId {
    pub const BOTH: [MachineId; 2] = [MachineId::Zero, MachineId::One];

    /// Position in a two-element array; also the machine's program id.
    pub fn index(self) -> usize {
        match self {
            MachineId::Zero => 0,
            MachineId::One => 1,
        }
    }

    pub fn peer(self) -> MachineId {
        match self {
            MachineId::Zero => MachineId::One,
            MachineId::One => MachineId::Zero,
        }
    }
}

/// How a paired run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// Both machines blocked on `rcv` with empty inboxes.
    Deadlock,
    /// Both machines ran off the program.
    Halted,
    /// One machine halted while the other waits forever.
    Mixed,
}

/// True if stepping the machine cannot change anything.
///
/// A waiting machine whose inbox has been refilled is live again.
pub fn is_stalled(status: Status, inbox_empty: bool) -> bool {
    match status {
        Status::Halted => true,
        Status::Waiting => inbox_empty,
        Status::Running => false,
    }
}

/// Classify two stalled machines. `None` while either is still live.
pub fn termination(machines: [(Status, bool); 2]) -> Option<Termination> {
    if !machines
        .iter()
        .all(|&(status, inbox_empty)| is_stalled(status, inbox_empty))
    {
        return None;
    }
    let termination = match (machines[0].0, machines[1].0) {
        (Status::Waiting, Status::Waiting) => Termination::Deadlock,
        (Status::Halted, Status::Halted) => Termination::Halted,
        _ => Termination::Mixed,
    };
    Some(termination)
}

/// Machine to offer the next step, given the one that just moved.
pub fn next_turn(policy: Policy, current: MachineId) -> MachineId {
    match policy {
        Policy::Alternate => current.peer(),
        Policy::Burst => current,
    }
}
