//! Channel strategies for the two execution modes.

use std::collections::VecDeque;

use crate::core::machine::{Channel, Receive};

/// Inbox of a paired machine.
///
/// Outgoing values are not stored here: the scheduler takes them from
/// [`Step::sent`](crate::core::machine::Step) and calls [`Mailbox::deliver`]
/// on the peer.
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    queue: VecDeque<i64>,
    delivered: u64,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value from the peer. Never blocks.
    pub fn deliver(&mut self, value: i64) {
        self.queue.push_back(value);
        self.delivered += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Total values ever delivered, including ones already received.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Pending values, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = i64> + '_ {
        self.queue.iter().copied()
    }
}

impl Channel for Mailbox {
    fn send(&mut self, _value: i64) {}

    fn receive(&mut self, _current: i64) -> Receive {
        match self.queue.pop_front() {
            Some(value) => Receive::Store(value),
            None => Receive::Block,
        }
    }
}

/// Channel for the single-machine sound variant.
///
/// `snd` plays a frequency; `rcv` recovers the last one played when its
/// register is nonzero. It never blocks.
#[derive(Debug, Clone, Default)]
pub struct SoundCard {
    last_played: Option<i64>,
    recovered: Option<i64>,
}

impl SoundCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_played(&self) -> Option<i64> {
        self.last_played
    }

    /// First frequency recovered, if any `rcv` has fired.
    pub fn recovered(&self) -> Option<i64> {
        self.recovered
    }
}

impl Channel for SoundCard {
    fn send(&mut self, value: i64) {
        self.last_played = Some(value);
    }

    fn receive(&mut self, current: i64) -> Receive {
        if current != 0 && self.recovered.is_none() {
            self.recovered = self.last_played;
        }
        Receive::Skip
    }
}
