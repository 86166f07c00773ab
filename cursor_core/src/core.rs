//! Cursor state machine
//!
//! Position tracking, boundary caching, direction reversal, pause/run control
//! and the visit-and-record step all live here.

use std::fmt;
use std::rc::Rc;

use log::{debug, trace};
use serde_json::Value;

use crate::{
    collection::Collection,
    config::{ApplyTarget, CursorConfig, CursorOption, Receiver},
    error::CursorError,
    key::CursorKey,
    outcome::{CursorOutcome, Direction, ReverseOptions, StepResult},
    snapshot::CursorStatus,
    values::{Deferred, ValueStore},
};

/// Callback invoked at every visited key.
///
/// The cursor passes itself in, so a controller may pause, reverse, replace
/// the controller or move the cursor; the running step observes the change.
pub type Controller<V, R, A> = Rc<dyn Fn(&Visit<'_, V, A>, &mut Cursor<V, R, A>) -> Option<R>>;

/// What a controller sees for one visited key
pub struct Visit<'a, V, A> {
    /// Source value, `None` when the key is absent from the source
    pub value: Option<&'a V>,
    pub key: &'a CursorKey,
    pub position: usize,
    pub receiver: Receiver<'a, V>,
    /// Extra parameters forwarded by the calling operation
    pub params: &'a [A],
}

/// Stateful cursor over an ordered key sequence
pub struct Cursor<V, R = V, A = ()> {
    source: Rc<Collection<V>>,
    keys: Rc<[CursorKey]>,
    last: isize,
    current: isize,
    /// Signed: negative while reversed
    increment: isize,
    start_at: isize,
    reversed: bool,
    paused: bool,
    counter: usize,
    done: bool,
    donep: bool,
    values: ValueStore<R>,
    last_return: Option<StepResult<R>>,
    controller: Controller<V, R, A>,
    apply: ApplyTarget,
}

fn magnitude(value: isize) -> isize {
    isize::try_from(value.unsigned_abs()).unwrap_or(isize::MAX)
}

impl<V, R, A> Cursor<V, R, A>
where
    V: 'static,
    R: Clone + 'static,
    A: 'static,
{
    /// Creates a cursor with an explicit controller.
    ///
    /// The argument wins over `config.controller`.
    pub fn with_controller(
        source: impl Into<Collection<V>>,
        controller: Controller<V, R, A>,
        config: CursorConfig<V, R, A>,
    ) -> Self {
        Self::build(source.into(), controller, config)
    }

    fn build(
        source: Collection<V>,
        controller: Controller<V, R, A>,
        config: CursorConfig<V, R, A>,
    ) -> Self {
        let keys: Rc<[CursorKey]> = match config.keys {
            Some(keys) => keys.into(),
            None => source.natural_keys().into(),
        };
        let last = isize::try_from(keys.len()).unwrap_or(isize::MAX) - 1;

        let mut cursor = Self {
            source: Rc::new(source),
            keys,
            last,
            current: 0,
            increment: magnitude(config.increment).max(1),
            start_at: magnitude(config.start_at),
            reversed: false,
            paused: true,
            counter: 0,
            done: false,
            donep: false,
            values: ValueStore::new(),
            last_return: None,
            controller,
            apply: config.apply,
        };
        debug!(
            "cursor created: keys={} increment={} start_at={} reverse={}",
            cursor.keys.len(),
            cursor.increment,
            cursor.start_at,
            config.reverse
        );

        if config.reverse {
            cursor.reverse(ReverseOptions::default());
        }
        cursor.reset();
        cursor
    }

    // Movement

    /// Steps forward by one increment (the action of `next`, whatever the
    /// reversed flag says about index order)
    pub fn next(&mut self) -> CursorOutcome<R> {
        self.next_with(&[])
    }

    pub fn next_with(&mut self, params: &[A]) -> CursorOutcome<R> {
        self.advance(Direction::Forward, params)
    }

    /// Steps backward by one increment
    pub fn previous(&mut self) -> CursorOutcome<R> {
        self.previous_with(&[])
    }

    pub fn previous_with(&mut self, params: &[A]) -> CursorOutcome<R> {
        self.advance(Direction::Backward, params)
    }

    /// Invokes the controller again at the current position
    pub fn repeat(&mut self) -> StepResult<R> {
        self.repeat_with(&[])
    }

    pub fn repeat_with(&mut self, params: &[A]) -> StepResult<R> {
        self.step(Direction::Stay, params)
    }

    /// Unpauses and walks forward until the boundary, a pause, or `count`
    /// visits. A zero count means no limit; the sign is ignored.
    pub fn run(&mut self, count: Option<isize>) -> CursorOutcome<R> {
        self.run_with(count, &[])
    }

    pub fn run_with(&mut self, count: Option<isize>, params: &[A]) -> CursorOutcome<R> {
        self.start_run(count);
        self.advance(Direction::Forward, params)
    }

    /// Like [`run`](Self::run) but walking backward
    pub fn run_back(&mut self, count: Option<isize>) -> CursorOutcome<R> {
        self.run_back_with(count, &[])
    }

    pub fn run_back_with(&mut self, count: Option<isize>, params: &[A]) -> CursorOutcome<R> {
        self.start_run(count);
        self.advance(Direction::Backward, params)
    }

    fn start_run(&mut self, count: Option<isize>) {
        if let Some(count) = count.filter(|count| *count != 0) {
            self.counter = count.unsigned_abs();
        }
        self.paused = false;
        debug!(
            "cursor run: position={} counter={}",
            self.current, self.counter
        );
    }

    /// Moves by `steps` keys without invoking the controller, saturating at
    /// either end. With `execute`, repeats at the new position.
    pub fn skip(&mut self, steps: isize, execute: bool) -> CursorOutcome<R> {
        self.skip_with(steps, execute, &[])
    }

    pub fn skip_with(&mut self, steps: isize, execute: bool, params: &[A]) -> CursorOutcome<R> {
        let delta = if self.reversed {
            steps.saturating_neg()
        } else {
            steps
        };
        self.current = self.current.saturating_add(delta).max(0).min(self.last);
        self.refresh_bounds();
        trace!("cursor skip: steps={} position={}", steps, self.current);

        if execute {
            CursorOutcome::Step(self.repeat_with(params))
        } else {
            CursorOutcome::Chain
        }
    }

    /// Jumps to the first key loosely equal to `key`.
    ///
    /// Only positions before the last one are searched, so the final key is
    /// never a jump target.
    pub fn goto_key(&mut self, key: impl Into<CursorKey>, execute: bool) -> CursorOutcome<R> {
        self.goto_key_with(key, execute, &[])
    }

    pub fn goto_key_with(
        &mut self,
        key: impl Into<CursorKey>,
        execute: bool,
        params: &[A],
    ) -> CursorOutcome<R> {
        let key = key.into();
        let found = (0..self.last).find(|position| self.keys[*position as usize].loosely_eq(&key));

        match found {
            Some(position) => {
                self.current = position;
                self.refresh_bounds();
                trace!("cursor goto: key={} position={}", key, position);
                if execute {
                    CursorOutcome::Step(self.repeat_with(params))
                } else {
                    CursorOutcome::Chain
                }
            }
            None => {
                debug!("cursor goto: key={} not found", key);
                CursorOutcome::Step(StepResult::exhausted(self.done, self.donep))
            }
        }
    }

    fn advance(&mut self, direction: Direction, params: &[A]) -> CursorOutcome<R> {
        let mut chained = !self.paused;
        loop {
            let result = self.step(direction, params);
            if self.paused && self.counter == 0 {
                return Self::finish(chained, result);
            }

            if self.is_complete(direction == Direction::Backward) {
                self.counter = 0;
                self.paused = true;
            } else if self.counter > 0 {
                self.counter -= 1;
                if self.counter == 0 {
                    self.paused = true;
                }
            }

            if self.paused {
                return Self::finish(chained, result);
            }
            chained = true;
        }
    }

    fn finish(chained: bool, result: StepResult<R>) -> CursorOutcome<R> {
        if chained {
            CursorOutcome::Chain
        } else {
            CursorOutcome::Step(result)
        }
    }

    fn step(&mut self, direction: Direction, params: &[A]) -> StepResult<R> {
        let target = self
            .current
            .saturating_add(self.increment * direction.sign());
        if !self.contains(target) {
            let (done, donep) = match direction {
                Direction::Stay => (self.done, self.donep),
                _ => (self.is_complete(false), self.is_complete(true)),
            };
            trace!(
                "cursor exhausted: direction={:?} position={} target={}",
                direction,
                self.current,
                target
            );
            return StepResult::exhausted(done, donep);
        }

        self.current = target;
        self.visit(target as usize, params)
    }

    fn visit(&mut self, position: usize, params: &[A]) -> StepResult<R> {
        let keys = Rc::clone(&self.keys);
        let source = Rc::clone(&self.source);
        let apply = self.apply.clone();
        let controller = Rc::clone(&self.controller);

        let key = &keys[position];
        trace!("cursor visit: position={} key={}", position, key);
        let visit = Visit {
            value: source.get(key),
            key,
            position,
            receiver: apply.resolve(&source),
            params,
        };
        let value = (*controller)(&visit, self);

        self.values.record(position, value.clone());
        self.refresh_bounds();
        let result = StepResult {
            value,
            key: Some(key.clone()),
            done: self.done,
            donep: self.donep,
        };
        self.last_return = Some(result.clone());
        result
    }

    // Direction and position control

    /// Flips direction: `next` now walks the other way. Does not move unless
    /// `options` asks for a reset.
    pub fn reverse(&mut self, options: ReverseOptions) -> &mut Self {
        self.reversed = !self.reversed;
        self.increment = -self.increment;
        debug!(
            "cursor reverse: reversed={} position={}",
            self.reversed, self.current
        );

        if options.reset || options.position.is_some() {
            self.reset_with(options.position, options.clear);
        } else if options.clear {
            self.clear_values();
        }
        self
    }

    /// Places the cursor one step before the configured start
    pub fn reset(&mut self) -> &mut Self {
        self.reset_with(None, false)
    }

    /// Places the cursor one step before `position` (or the configured start
    /// when `position` is absent or out of range), optionally clearing values.
    ///
    /// While reversed, positions count from the end.
    pub fn reset_with(&mut self, position: Option<isize>, clear: bool) -> &mut Self {
        if clear {
            self.values.clear();
        }
        let base = position
            .filter(|position| self.contains(*position))
            .unwrap_or(self.start_at);
        let landing = if self.reversed { self.last - base } else { base };
        self.current = landing.saturating_sub(self.increment);
        self.refresh_bounds();
        debug!(
            "cursor reset: position={} done={} donep={}",
            self.current, self.done, self.donep
        );
        self
    }

    /// Sets paused to `state`, or toggles it
    pub fn pause(&mut self, state: Option<bool>) -> &mut Self {
        self.paused = state.unwrap_or(!self.paused);
        self
    }

    /// Whether one more increment (backward when `previous`) would leave the
    /// key sequence
    pub fn is_complete(&self, previous: bool) -> bool {
        let offset = if previous {
            -self.increment
        } else {
            self.increment
        };
        !self.contains(self.current.saturating_add(offset))
    }

    fn contains(&self, position: isize) -> bool {
        position >= 0 && position <= self.last
    }

    fn refresh_bounds(&mut self) {
        self.done = self.is_complete(false);
        self.donep = self.is_complete(true);
    }

    // Options

    pub fn set_option(&mut self, option: CursorOption<V, R, A>) -> &mut Self {
        debug!("cursor option: {}", option.name());
        match option {
            CursorOption::Increment(increment) => {
                let increment = magnitude(increment).max(1);
                self.increment = if self.reversed { -increment } else { increment };
            }
            CursorOption::StartAt(start_at) => self.start_at = magnitude(start_at),
            CursorOption::Apply(apply) => self.apply = apply,
            CursorOption::Controller(controller) => self.controller = controller,
        }
        self
    }

    pub fn set_options(
        &mut self,
        options: impl IntoIterator<Item = CursorOption<V, R, A>>,
    ) -> &mut Self {
        for option in options {
            self.set_option(option);
        }
        self
    }

    /// Dynamic `(name, value)` form. Names other than `increment`, `startAt`
    /// and `apply` are ignored.
    pub fn set_option_named(
        &mut self,
        name: &str,
        value: &Value,
    ) -> Result<&mut Self, CursorError> {
        match CursorOption::from_json(name, value)? {
            Some(option) => Ok(self.set_option(option)),
            None => {
                debug!("cursor option ignored: {}", name);
                Ok(self)
            }
        }
    }

    /// Dynamic record form. Nothing is applied if any field is invalid.
    pub fn set_options_json(&mut self, record: &Value) -> Result<&mut Self, CursorError> {
        let fields = record.as_object().ok_or(CursorError::NotARecord)?;
        let mut options = Vec::new();
        for (name, value) in fields {
            match CursorOption::from_json(name, value)? {
                Some(option) => options.push(option),
                None => debug!("cursor option ignored: {}", name),
            }
        }
        Ok(self.set_options(options))
    }

    // Inspection

    /// Recorded results by position
    pub fn values(&self) -> Vec<Option<R>> {
        self.values.positional()
    }

    /// Recorded results by key, in position order
    pub fn values_by_key(&self) -> Vec<(CursorKey, R)> {
        self.values.keyed(&self.keys)
    }

    /// The result recorded for `key`, if any
    pub fn value(&self, key: impl Into<CursorKey>) -> Option<R> {
        self.value_entry(key).map(|(_, value)| value)
    }

    pub fn value_entry(&self, key: impl Into<CursorKey>) -> Option<(CursorKey, R)> {
        let key = key.into();
        let position = self.keys.iter().position(|existing| existing.loosely_eq(&key))?;
        self.values
            .get(position)
            .map(|value| (self.keys[position].clone(), value))
    }

    pub fn clear_values(&mut self) -> &mut Self {
        self.values.clear();
        self
    }

    pub fn status(&self) -> CursorStatus<R> {
        CursorStatus {
            position: self.current,
            end: self.last,
            done: self.done,
            donep: self.donep,
            increment: self.increment.unsigned_abs(),
            values: self.values.positional(),
            keys: self.keys.to_vec(),
            reversed: self.reversed,
            paused: self.paused,
            apply: self.apply.clone(),
        }
    }

    pub fn last_return(&self) -> Option<&StepResult<R>> {
        self.last_return.as_ref()
    }

    /// Captures the current position for a result produced later.
    ///
    /// The caller moves the cursor on once the deferred work has completed.
    pub fn defer(&self) -> Deferred<R> {
        let position = usize::try_from(self.current)
            .ok()
            .filter(|_| self.contains(self.current));
        let key = position.map(|position| self.keys[position].clone());
        Deferred::capture(&self.values, position, key, self.done, self.donep)
    }

    /// Single forward steps until the forward boundary.
    ///
    /// The cursor is paused before each step, so every visited key is
    /// yielded.
    pub fn steps(&mut self) -> Steps<'_, V, R, A> {
        Steps { cursor: self }
    }
}

impl<V, A> Cursor<V, V, A>
where
    V: Clone + 'static,
    A: 'static,
{
    /// Creates a cursor that records each visited value unchanged
    pub fn new(source: impl Into<Collection<V>>) -> Self {
        Self::with_config(source, CursorConfig::default())
    }

    /// Uses `config.controller`, or the identity controller when absent
    pub fn with_config(source: impl Into<Collection<V>>, config: CursorConfig<V, V, A>) -> Self {
        let controller = config.controller.clone().unwrap_or_else(crate::identity);
        Self::build(source.into(), controller, config)
    }
}

impl<V, R, A> Cursor<V, R, A> {
    pub fn position(&self) -> isize {
        self.current
    }

    /// Index of the final key, -1 when empty
    pub fn last(&self) -> isize {
        self.last
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[CursorKey] {
        &self.keys
    }

    pub fn key_at(&self, position: usize) -> Option<&CursorKey> {
        self.keys.get(position)
    }

    pub fn source(&self) -> &Collection<V> {
        &self.source
    }

    pub fn increment(&self) -> usize {
        self.increment.unsigned_abs()
    }

    pub fn start_at(&self) -> usize {
        self.start_at.unsigned_abs()
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_donep(&self) -> bool {
        self.donep
    }
}

impl<V, R, A> fmt::Debug for Cursor<V, R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("keys", &self.keys)
            .field("current", &self.current)
            .field("last", &self.last)
            .field("increment", &self.increment)
            .field("start_at", &self.start_at)
            .field("reversed", &self.reversed)
            .field("paused", &self.paused)
            .field("counter", &self.counter)
            .field("done", &self.done)
            .field("donep", &self.donep)
            .field("apply", &self.apply)
            .finish_non_exhaustive()
    }
}

/// Iterator of single forward steps, see [`Cursor::steps`]
pub struct Steps<'c, V, R, A> {
    cursor: &'c mut Cursor<V, R, A>,
}

impl<V, R, A> Iterator for Steps<'_, V, R, A>
where
    V: 'static,
    R: Clone + 'static,
    A: 'static,
{
    type Item = StepResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.is_complete(false) {
            return None;
        }
        self.cursor
            .pause(Some(true))
            .next()
            .into_step()
            .filter(|result| !result.is_exhausted())
    }
}
