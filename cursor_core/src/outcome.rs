//! Step results and operation outcomes

use crate::key::CursorKey;
use serde::{Deserialize, Serialize};

/// Result record of a controller-invoking operation
///
/// `value` and `key` are both `None` when the move was refused
/// (boundary-exhausted or key-not-found).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult<R> {
    pub value: Option<R>,
    pub key: Option<CursorKey>,
    /// No further move forward by one increment
    pub done: bool,
    /// No further move backward by one increment
    pub donep: bool,
}

impl<R> StepResult<R> {
    /// A refused move
    pub fn exhausted(done: bool, donep: bool) -> Self {
        Self {
            value: None,
            key: None,
            done,
            donep,
        }
    }

    /// Returns true if no key was visited
    pub fn is_exhausted(&self) -> bool {
        self.key.is_none()
    }
}

/// Outcome of an operation that yields either a result or the cursor itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorOutcome<R> {
    /// A single result record
    Step(StepResult<R>),
    /// Nothing to report; keep using the cursor (bulk traversal, plain moves)
    Chain,
}

impl<R> CursorOutcome<R> {
    pub fn step(&self) -> Option<&StepResult<R>> {
        match self {
            CursorOutcome::Step(result) => Some(result),
            CursorOutcome::Chain => None,
        }
    }

    pub fn into_step(self) -> Option<StepResult<R>> {
        match self {
            CursorOutcome::Step(result) => Some(result),
            CursorOutcome::Chain => None,
        }
    }

    pub fn is_chain(&self) -> bool {
        matches!(self, CursorOutcome::Chain)
    }
}

/// Movement relative to the signed increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The action of `next`
    Forward,
    /// The action of `previous`
    Backward,
    /// Stay in place (`repeat`)
    Stay,
}

impl Direction {
    pub fn sign(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
            Direction::Stay => 0,
        }
    }
}

/// Options for [`Cursor::reverse`](crate::Cursor::reverse)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReverseOptions {
    /// Reset the position after reversing
    pub reset: bool,
    /// Clear recorded values
    pub clear: bool,
    /// Reset position; supplying one implies `reset`
    pub position: Option<isize>,
}

impl ReverseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reset(mut self) -> Self {
        self.reset = true;
        self
    }

    pub fn with_clear(mut self) -> Self {
        self.clear = true;
        self
    }

    pub fn at_position(mut self, position: isize) -> Self {
        self.position = Some(position);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_shape() {
        let result: StepResult<i32> = StepResult::exhausted(true, false);
        assert!(result.is_exhausted());
        assert_eq!(result.value, None);
        assert!(result.done);
        assert!(!result.donep);
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = CursorOutcome::Step(StepResult {
            value: Some(4),
            key: Some(CursorKey::Index(3)),
            done: false,
            donep: false,
        });
        assert_eq!(outcome.step().and_then(|r| r.value), Some(4));
        assert!(!outcome.is_chain());
        assert_eq!(CursorOutcome::<i32>::Chain.into_step(), None);
    }

    #[test]
    fn test_reverse_options_builder() {
        let options = ReverseOptions::new().with_clear().at_position(2);
        assert!(options.clear);
        assert!(!options.reset);
        assert_eq!(options.position, Some(2));
    }
}
