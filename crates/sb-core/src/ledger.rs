use std::io::Write;

use crate::error::CoreResult;
use crate::event::Event;

/// Append-only record of everything that happened in a run.
///
/// There is no way to edit or remove an event once appended. Corrections
/// are expressed by appending new events that refer back to old ones.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    events: Vec<Event>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its index.
    pub fn append(&mut self, event: Event) -> usize {
        self.events.push(event);
        self.events.len() - 1
    }

    /// All events in append order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterate events in append order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The most recent event.
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Events recorded for a given turn.
    pub fn at_turn(&self, turn: u32) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.turn == turn)
    }

    /// Events in which the named agent appears.
    pub fn involving<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Event> {
        self.events.iter().filter(move |e| e.involves(name))
    }

    /// Write every event as one JSON object per line.
    pub fn write_jsonl(&self, writer: &mut impl Write) -> CoreResult<()> {
        for event in &self.events {
            let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
