//! Cursor status snapshot

use crate::{ApplyTarget, CursorKey};
use serde::Serialize;

/// Point-in-time view of a cursor's state
#[derive(Debug, Clone, Serialize)]
pub struct CursorStatus<R> {
    pub position: isize,
    /// Index of the final key, -1 when empty
    pub end: isize,
    pub done: bool,
    pub donep: bool,
    /// Absolute increment
    pub increment: usize,
    pub values: Vec<Option<R>>,
    pub keys: Vec<CursorKey>,
    pub reversed: bool,
    pub paused: bool,
    pub apply: ApplyTarget,
}

#[cfg(test)]
impl<R: Serialize> CursorStatus<R> {
    /// Compute a deterministic hash of the snapshot state
    /// This is used for fast comparison of equivalent traversals
    pub fn hash(&self) -> u64 {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();

        hasher.update(self.position.to_le_bytes());
        hasher.update(self.end.to_le_bytes());
        hasher.update([self.done as u8, self.donep as u8]);
        hasher.update(self.increment.to_le_bytes());

        // Values and keys go through their JSON form
        hasher.update(serde_json::to_vec(&self.values).unwrap());
        hasher.update(serde_json::to_vec(&self.keys).unwrap());

        hasher.update([self.reversed as u8, self.paused as u8]);
        hasher.update(self.apply.kind().as_bytes());

        let result = hasher.finalize();
        let bytes: [u8; 8] = result[..8].try_into().unwrap();
        u64::from_le_bytes(bytes)
    }
}
