//! Incoming ring buffer (§3): a bounded FIFO of incoming message records.
//! Evicts the oldest entry on overflow; drained (destructively) by
//! `read-messages`.

use std::collections::VecDeque;

use crate::relay::IncomingMessage;

pub const CAPACITY: usize = 1000;

/// At most this many matching records are returned by a single drain,
/// even though all matching records are removed from the buffer (spec §4.E
/// / §9: "destructive on read", with the documented truncation quirk).
pub const DRAIN_LIMIT: usize = 50;

#[derive(Default)]
pub struct RingBuffer {
    records: VecDeque<IncomingMessage>,
}

impl RingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `msg`, evicting the oldest entry if already at capacity.
    pub fn push(&mut self, msg: IncomingMessage) {
        if self.records.len() >= CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(msg);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Drains records matching `room` (case-insensitive), removing all of
    /// them from the buffer but returning only the most recent
    /// `DRAIN_LIMIT`. Records from other rooms are left untouched, in their
    /// original order.
    pub fn drain(&mut self, room: Option<&str>) -> Vec<IncomingMessage> {
        let room_lower = room.map(|r| r.to_lowercase());

        let mut matched = Vec::new();
        let mut kept = VecDeque::with_capacity(self.records.len());

        for record in self.records.drain(..) {
            let matches = match &room_lower {
                Some(r) => record.room.to_lowercase() == *r,
                None => true,
            };
            if matches {
                matched.push(record);
            } else {
                kept.push_back(record);
            }
        }

        self.records = kept;

        if matched.len() > DRAIN_LIMIT {
            matched.split_off(matched.len() - DRAIN_LIMIT)
        } else {
            matched
        }
    }
}

#[cfg(test)]
mod tests;
