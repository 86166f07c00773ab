//! # Cursor Core
//!
//! A stateful cursor over the keys of a sequence or mapping.
//!
//! ## Philosophy
//!
//! - **One state machine**: position, boundaries, direction and pause/run
//!   control are facets of a single [`Cursor`]
//! - **Results, not errors**: a refused move is a [`StepResult`] with no key
//! - **Synchronous**: bulk traversal is a plain loop; nothing blocks or yields
//! - **Owned state**: every cursor owns its configuration and recorded values
//!
//! ## Design
//!
//! The crate provides:
//! - Cursor: movement (`next`, `previous`, `repeat`, `run`, `run_back`, `skip`,
//!   `goto_key`), direction (`reverse`, `reset`, `pause`) and inspection
//! - Controller: callback invoked at each visited key, its result recorded
//! - CursorStatus: serializable state snapshot
//! - Deferred: handle for recording a result produced later
//!
//! ## Example
//!
//! ```
//! use cursor_core::{Cursor, CursorConfig, CursorKey};
//!
//! let mut cursor = Cursor::<i32>::with_config(
//!     (1..=10).collect::<Vec<_>>(),
//!     CursorConfig::default().with_increment(5),
//! );
//!
//! let first = cursor.next().into_step().unwrap();
//! assert_eq!(first.value, Some(1));
//! assert_eq!(first.key, Some(CursorKey::Index(0)));
//! assert!(first.donep);
//!
//! let second = cursor.next().into_step().unwrap();
//! assert_eq!(second.value, Some(6));
//! assert!(second.done);
//! ```

use std::rc::Rc;

pub mod collection;
pub mod config;
pub mod core;
pub mod error;
pub mod key;
pub mod outcome;
pub mod snapshot;
pub mod values;

pub use collection::Collection;
pub use config::{ApplyTarget, CursorConfig, CursorOption, Receiver};
pub use self::core::{Controller, Cursor, Steps, Visit};
pub use error::CursorError;
pub use key::CursorKey;
pub use outcome::{CursorOutcome, Direction, ReverseOptions, StepResult};
pub use snapshot::CursorStatus;
pub use values::Deferred;

/// Wraps a closure as a [`Controller`]
pub fn controller<V, R, A, F>(f: F) -> Controller<V, R, A>
where
    F: Fn(&Visit<'_, V, A>, &mut Cursor<V, R, A>) -> Option<R> + 'static,
{
    Rc::new(f)
}

/// Controller that records each visited value unchanged
pub fn identity<V, A>() -> Controller<V, V, A>
where
    V: Clone + 'static,
    A: 'static,
{
    controller(|visit: &Visit<'_, V, A>, _: &mut Cursor<V, V, A>| visit.value.cloned())
}

/// Builds a cursor over `source`.
///
/// `controller` wins over `config.controller`; with neither, the identity
/// controller is used.
pub fn create_cursor<V, A>(
    source: impl Into<Collection<V>>,
    controller: Option<Controller<V, V, A>>,
    config: CursorConfig<V, V, A>,
) -> Cursor<V, V, A>
where
    V: Clone + 'static,
    A: 'static,
{
    match controller {
        Some(controller) => Cursor::with_controller(source, controller, config),
        None => Cursor::with_config(source, config),
    }
}
