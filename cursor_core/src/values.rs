//! Recorded controller results

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::key::CursorKey;
use crate::outcome::StepResult;

/// Sparse store of the latest controller result per position
///
/// Shared with [`Deferred`] handles so late results land in the same store.
#[derive(Debug)]
pub struct ValueStore<R> {
    slots: Rc<RefCell<BTreeMap<usize, R>>>,
}

impl<R> ValueStore<R> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    /// Records a result; `None` empties the slot
    pub fn record(&self, position: usize, value: Option<R>) {
        let mut slots = self.slots.borrow_mut();
        match value {
            Some(value) => {
                slots.insert(position, value);
            }
            None => {
                slots.remove(&position);
            }
        }
    }

    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    fn handle(&self) -> Rc<RefCell<BTreeMap<usize, R>>> {
        Rc::clone(&self.slots)
    }
}

impl<R: Clone> ValueStore<R> {
    pub fn get(&self, position: usize) -> Option<R> {
        self.slots.borrow().get(&position).cloned()
    }

    /// Positional view, as long as the highest recorded position + 1
    pub fn positional(&self) -> Vec<Option<R>> {
        let slots = self.slots.borrow();
        let len = slots.keys().next_back().map_or(0, |last| last + 1);
        let mut values = vec![None; len];
        for (position, value) in slots.iter() {
            values[*position] = Some(value.clone());
        }
        values
    }

    /// Keyed view in position order; positions without a key are skipped
    pub fn keyed(&self, keys: &[CursorKey]) -> Vec<(CursorKey, R)> {
        self.slots
            .borrow()
            .iter()
            .filter_map(|(position, value)| {
                keys.get(*position).map(|key| (key.clone(), value.clone()))
            })
            .collect()
    }
}

impl<R> Default for ValueStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolution handle for a result produced outside the controller call
///
/// Captures the position, key and boundary state at creation time. Resolving
/// writes into the cursor's value store; the cursor itself is not touched.
#[derive(Debug)]
pub struct Deferred<R> {
    slots: Rc<RefCell<BTreeMap<usize, R>>>,
    position: Option<usize>,
    key: Option<CursorKey>,
    done: bool,
    donep: bool,
}

impl<R: Clone> Deferred<R> {
    pub(crate) fn capture(
        store: &ValueStore<R>,
        position: Option<usize>,
        key: Option<CursorKey>,
        done: bool,
        donep: bool,
    ) -> Self {
        Self {
            slots: store.handle(),
            position,
            key,
            done,
            donep,
        }
    }

    /// Stores `value` at the captured position and reports it
    pub fn resolve(&self, value: R) -> StepResult<R> {
        if let Some(position) = self.position {
            self.slots.borrow_mut().insert(position, value.clone());
        }
        StepResult {
            value: Some(value),
            key: self.key.clone(),
            done: self.done,
            donep: self.donep,
        }
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn key(&self) -> Option<&CursorKey> {
        self.key.as_ref()
    }
}
