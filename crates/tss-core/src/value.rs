//! Telemetry value helpers
//!
//! Telemetry payloads are free-form JSON trees whose schema belongs to the
//! source. Everything here is total: lookups on the wrong shape resolve to
//! "absent" and comparisons between incompatible kinds resolve to `false`.

use std::cmp::Ordering;
use std::str::FromStr;

use serde_json::{Map, Value};

/// Resolve a dotted path (`"status.started"`) against a telemetry tree.
///
/// Each segment indexes into a mapping. A missing key or a non-mapping
/// intermediate yields `None`.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |current, segment| current.as_object()?.get(segment))
}

/// Same as [`get_path`] but rooted at a mapping
pub fn get_path_in<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    segments.try_fold(root.get(first)?, |current, segment| {
        current.as_object()?.get(segment)
    })
}

/// Clone the value at `path`, or an empty mapping when absent
pub fn subtree_or_empty(root: &Map<String, Value>, path: &str) -> Value {
    get_path_in(root, path)
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

/// Truthiness of a telemetry value.
///
/// Absent, `null`, `false`, zero, and empty strings/arrays/mappings are false.
pub fn to_bool(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Comparison operator used by completion criteria
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CompareOp {
    #[default]
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
        }
    }

    /// Apply the operator. `None` on either side means "absent".
    pub fn apply(self, actual: Option<&Value>, target: Option<&Value>) -> bool {
        match self {
            CompareOp::Eq => optional_equal(actual, target),
            CompareOp::Ne => !optional_equal(actual, target),
            CompareOp::Gt => ordered(actual, target).map_or(false, Ordering::is_gt),
            CompareOp::Gte => ordered(actual, target).map_or(false, Ordering::is_ge),
            CompareOp::Lt => ordered(actual, target).map_or(false, Ordering::is_lt),
            CompareOp::Lte => ordered(actual, target).map_or(false, Ordering::is_le),
        }
    }
}

impl FromStr for CompareOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(CompareOp::Eq),
            "ne" => Ok(CompareOp::Ne),
            "gt" => Ok(CompareOp::Gt),
            "gte" => Ok(CompareOp::Gte),
            "lt" => Ok(CompareOp::Lt),
            "lte" => Ok(CompareOp::Lte),
            _ => Err(()),
        }
    }
}

/// Evaluate an operator given by name. Unknown names fail closed.
pub fn compare(op: &str, actual: Option<&Value>, target: Option<&Value>) -> bool {
    op.parse::<CompareOp>()
        .map_or(false, |op| op.apply(actual, target))
}

fn optional_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => values_equal(a, b),
        _ => false,
    }
}

/// Structural equality where `1` and `1.0` are equal
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return x == y;
            }
            x.as_f64() == y.as_f64()
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).map_or(false, |w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

/// Natural ordering between two present values of the same kind
fn ordered(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    match (a?, b?) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
