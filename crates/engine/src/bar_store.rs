use core_types::{Bar, CoreError};
use std::collections::VecDeque;

/// How an accepted bar changed the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreUpdate {
    /// A new bar was appended (possibly evicting the oldest).
    Appended,
    /// The still-forming last bar was replaced in place.
    Replaced,
}

/// A bounded, timestamp-ordered bar history for one instrument.
#[derive(Debug, Clone)]
pub struct BarStore {
    bars: VecDeque<Bar>,
    capacity: usize,
}

impl BarStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            bars: VecDeque::with_capacity(capacity + 1),
            capacity: capacity.max(1),
        }
    }

    /// Inserts or replaces `bar`.
    ///
    /// A bar with the same timestamp as the last stored bar replaces it; a later
    /// timestamp appends. Malformed or out-of-order bars are rejected and leave
    /// the store untouched.
    pub fn update(&mut self, bar: Bar) -> Result<StoreUpdate, CoreError> {
        bar.validate()?;

        match self.bars.back_mut() {
            Some(last) if bar.timestamp == last.timestamp => {
                *last = bar;
                return Ok(StoreUpdate::Replaced);
            }
            Some(last) if bar.timestamp < last.timestamp => {
                return Err(CoreError::InvalidInput(
                    "timestamp".to_string(),
                    format!("{} is older than the last stored bar {}", bar.timestamp, last.timestamp),
                ));
            }
            _ => {}
        }

        self.bars.push_back(bar);
        while self.bars.len() > self.capacity {
            self.bars.pop_front();
        }
        Ok(StoreUpdate::Appended)
    }

    /// The stored bars, oldest first.
    pub fn window(&mut self) -> &[Bar] {
        self.bars.make_contiguous()
    }

    pub fn to_vec(&self) -> Vec<Bar> {
        self.bars.iter().copied().collect()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
