//! Cursor configuration
//!
//! Every cursor owns its configuration. Defaults are rebuilt per instance and
//! nothing here is shared by reference between cursors.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::collection::Collection;
use crate::core::Controller;
use crate::error::CursorError;
use crate::key::CursorKey;

/// The receiver a controller is invoked with
#[derive(Clone, Default)]
pub enum ApplyTarget {
    /// No receiver
    #[default]
    None,
    /// The cursor's source collection
    Source,
    /// An arbitrary caller-supplied value
    Value(Rc<dyn Any>),
}

impl ApplyTarget {
    pub fn value<T: Any>(value: T) -> Self {
        ApplyTarget::Value(Rc::new(value))
    }

    /// Maps the dynamic form: `true` is the source, falsy values (`false`,
    /// `null`, zero, `""`) are none, anything else is used verbatim
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => ApplyTarget::None,
            Value::Number(n) if n.as_f64() == Some(0.0) => ApplyTarget::None,
            Value::String(s) if s.is_empty() => ApplyTarget::None,
            Value::Bool(true) => ApplyTarget::Source,
            other => ApplyTarget::Value(Rc::new(other.clone())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApplyTarget::None => "none",
            ApplyTarget::Source => "source",
            ApplyTarget::Value(_) => "value",
        }
    }

    /// Resolves the target against the cursor's source collection
    pub fn resolve<'a, V>(&'a self, source: &'a Collection<V>) -> Receiver<'a, V> {
        match self {
            ApplyTarget::None => Receiver::None,
            ApplyTarget::Source => Receiver::Source(source),
            ApplyTarget::Value(value) => Receiver::Value(value.as_ref()),
        }
    }
}

impl fmt::Debug for ApplyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyTarget::None => write!(f, "None"),
            ApplyTarget::Source => write!(f, "Source"),
            ApplyTarget::Value(_) => write!(f, "Value(..)"),
        }
    }
}

impl Serialize for ApplyTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.kind())
    }
}

/// A resolved receiver, as seen by a controller
pub enum Receiver<'a, V> {
    None,
    Source(&'a Collection<V>),
    Value(&'a (dyn Any + 'static)),
}

impl<V> Clone for Receiver<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Receiver<'_, V> {}

impl<'a, V> Receiver<'a, V> {
    pub fn is_none(&self) -> bool {
        matches!(self, Receiver::None)
    }

    pub fn source(&self) -> Option<&'a Collection<V>> {
        match *self {
            Receiver::Source(source) => Some(source),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match *self {
            Receiver::Value(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// Construction-time configuration
pub struct CursorConfig<V, R = V, A = ()> {
    /// Step magnitude; the sign is ignored
    pub increment: isize,
    /// First visited offset; the sign is ignored
    pub start_at: isize,
    /// Explicit key sequence, used verbatim
    pub keys: Option<Vec<CursorKey>>,
    /// Reverse once at construction
    pub reverse: bool,
    pub apply: ApplyTarget,
    /// Used when no controller argument is given
    pub controller: Option<Controller<V, R, A>>,
}

impl<V, R, A> CursorConfig<V, R, A> {
    pub fn new() -> Self {
        Self {
            increment: 1,
            start_at: 0,
            keys: None,
            reverse: false,
            apply: ApplyTarget::None,
            controller: None,
        }
    }

    pub fn with_increment(mut self, increment: isize) -> Self {
        self.increment = increment;
        self
    }

    pub fn with_start_at(mut self, start_at: isize) -> Self {
        self.start_at = start_at;
        self
    }

    pub fn with_keys<K: Into<CursorKey>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_apply(mut self, apply: ApplyTarget) -> Self {
        self.apply = apply;
        self
    }

    pub fn with_controller(mut self, controller: Controller<V, R, A>) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Parses a JSON configuration record.
    ///
    /// Recognized fields: `increment`, `startAt`, `keys`, `reverse`, `apply`.
    /// Unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self, CursorError> {
        let raw: RawConfig =
            serde_json::from_str(json).map_err(|err| CursorError::Parse(err.to_string()))?;
        let increment = match raw.increment {
            Some(value) => json_integer("increment", &value)?,
            None => 1,
        };
        let start_at = match raw.start_at {
            Some(value) => json_integer("startAt", &value)?,
            None => 0,
        };
        Ok(Self {
            increment,
            start_at,
            keys: raw.keys,
            reverse: raw.reverse.unwrap_or(false),
            apply: raw.apply.as_ref().map_or(ApplyTarget::None, ApplyTarget::from_json),
            controller: None,
        })
    }
}

impl<V, R, A> Default for CursorConfig<V, R, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, R, A> Clone for CursorConfig<V, R, A> {
    fn clone(&self) -> Self {
        Self {
            increment: self.increment,
            start_at: self.start_at,
            keys: self.keys.clone(),
            reverse: self.reverse,
            apply: self.apply.clone(),
            controller: self.controller.clone(),
        }
    }
}

impl<V, R, A> fmt::Debug for CursorConfig<V, R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorConfig")
            .field("increment", &self.increment)
            .field("start_at", &self.start_at)
            .field("keys", &self.keys)
            .field("reverse", &self.reverse)
            .field("apply", &self.apply)
            .field("controller", &self.controller.as_ref().map(|_| ".."))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    increment: Option<Value>,
    start_at: Option<Value>,
    keys: Option<Vec<CursorKey>>,
    reverse: Option<bool>,
    apply: Option<Value>,
}

/// A single option accepted after construction.
///
/// Keys and the reverse flag cannot be changed this way.
pub enum CursorOption<V, R = V, A = ()> {
    Increment(isize),
    StartAt(isize),
    Apply(ApplyTarget),
    Controller(Controller<V, R, A>),
}

impl<V, R, A> CursorOption<V, R, A> {
    pub fn name(&self) -> &'static str {
        match self {
            CursorOption::Increment(_) => "increment",
            CursorOption::StartAt(_) => "startAt",
            CursorOption::Apply(_) => "apply",
            CursorOption::Controller(_) => "controller",
        }
    }

    /// Converts a dynamic `(name, value)` pair.
    ///
    /// Returns `Ok(None)` for names that are not settable after construction.
    pub fn from_json(name: &str, value: &Value) -> Result<Option<Self>, CursorError> {
        let option = match name {
            "increment" => CursorOption::Increment(json_integer(name, value)?),
            "startAt" => CursorOption::StartAt(json_integer(name, value)?),
            "apply" => CursorOption::Apply(ApplyTarget::from_json(value)),
            "controller" => {
                return Err(CursorError::InvalidOption {
                    name: name.into(),
                    reason: "controllers cannot be supplied as data".into(),
                })
            }
            _ => return Ok(None),
        };
        Ok(Some(option))
    }
}

fn json_integer(name: &str, value: &Value) -> Result<isize, CursorError> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .and_then(|i| isize::try_from(i).ok())
        .ok_or_else(|| CursorError::InvalidOption {
            name: name.into(),
            reason: format!("expected an integer, got {}", value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config: CursorConfig<i32> = CursorConfig::default();
        assert_eq!(config.increment, 1);
        assert_eq!(config.start_at, 0);
        assert!(config.keys.is_none());
        assert!(!config.reverse);
        assert_eq!(config.apply.kind(), "none");
        assert!(config.controller.is_none());
    }

    #[test]
    fn test_from_json() {
        let config: CursorConfig<i32> = CursorConfig::from_json(
            r#"{"increment": -3, "startAt": 2, "keys": [0, "a"],
                "reverse": true, "apply": true, "other": 1}"#,
        )
        .unwrap();
        assert_eq!(config.increment, -3);
        assert_eq!(config.start_at, 2);
        assert_eq!(
            config.keys,
            Some(vec![CursorKey::Index(0), CursorKey::name("a")])
        );
        assert!(config.reverse);
        assert_eq!(config.apply.kind(), "source");
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        let result = CursorConfig::<i32>::from_json(r#"{"increment": "five"}"#);
        assert!(matches!(result, Err(CursorError::InvalidOption { .. })));

        let result = CursorConfig::<i32>::from_json(r#"{"startAt": 1.5}"#);
        assert!(matches!(result, Err(CursorError::InvalidOption { .. })));

        let result = CursorConfig::<i32>::from_json("[1, 2]");
        assert!(matches!(result, Err(CursorError::Parse(_))));
    }

    #[test]
    fn test_whole_floats_match_option_parsing() {
        let config = CursorConfig::<i32>::from_json(r#"{"increment": 2.0, "startAt": 3.0}"#)
            .unwrap();
        assert_eq!(config.increment, 2);
        assert_eq!(config.start_at, 3);

        let option = CursorOption::<i32>::from_json("increment", &json!(2.0)).unwrap();
        assert!(matches!(option, Some(CursorOption::Increment(2))));
    }

    #[test]
    fn test_apply_from_json() {
        assert_eq!(ApplyTarget::from_json(&json!(null)).kind(), "none");
        assert_eq!(ApplyTarget::from_json(&json!(false)).kind(), "none");
        assert_eq!(ApplyTarget::from_json(&json!(0)).kind(), "none");
        assert_eq!(ApplyTarget::from_json(&json!(-0.0)).kind(), "none");
        assert_eq!(ApplyTarget::from_json(&json!("")).kind(), "none");
        assert_eq!(ApplyTarget::from_json(&json!(true)).kind(), "source");
        assert_eq!(ApplyTarget::from_json(&json!(1)).kind(), "value");
        assert_eq!(ApplyTarget::from_json(&json!("x")).kind(), "value");

        let config = CursorConfig::<i32>::from_json(r#"{"apply": 0}"#).unwrap();
        assert_eq!(config.apply.kind(), "none");

        let target = ApplyTarget::from_json(&json!({"name": "ctx"}));
        let source: Collection<i32> = Collection::new();
        let receiver = target.resolve(&source);
        assert_eq!(
            receiver.downcast_ref::<Value>(),
            Some(&json!({"name": "ctx"}))
        );
    }

    #[test]
    fn test_option_from_json() {
        let option = CursorOption::<i32>::from_json("increment", &json!(4)).unwrap();
        assert!(matches!(option, Some(CursorOption::Increment(4))));

        let ignored = CursorOption::<i32>::from_json("keys", &json!([1, 2])).unwrap();
        assert!(ignored.is_none());

        let bad = CursorOption::<i32>::from_json("startAt", &json!("x"));
        assert!(matches!(bad, Err(CursorError::InvalidOption { .. })));

        let controller = CursorOption::<i32>::from_json("controller", &json!(1));
        assert!(controller.is_err());
    }

    #[test]
    fn test_apply_serializes_as_kind() {
        assert_eq!(
            serde_json::to_string(&ApplyTarget::value(5u8)).unwrap(),
            r#""value""#
        );
    }
}
