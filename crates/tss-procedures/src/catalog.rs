//! Procedure catalog
//!
//! File layout:
//!
//! ```json
//! { "ltv": { "<procedure id>": { "title": "...", "steps": [ ... ] } } }
//! ```
//!
//! Namespace and procedure order follow the file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tss_core::{get_path, CompareOp, TssError, TssResult};

/// Namespace holding vehicle procedures
pub const LTV_NAMESPACE: &str = "ltv";

/// Whether a step must be done before moving on.
///
/// Only `required` and `optional` carry meaning; any other label is kept
/// verbatim and treated like `optional`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Criticality {
    Required,
    #[default]
    Optional,
    Other(String),
}

impl Criticality {
    pub fn as_str(&self) -> &str {
        match self {
            Criticality::Required => "required",
            Criticality::Optional => "optional",
            Criticality::Other(label) => label,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Criticality::Required)
    }
}

impl From<String> for Criticality {
    fn from(label: String) -> Self {
        match label.as_str() {
            "required" => Criticality::Required,
            "optional" => Criticality::Optional,
            _ => Criticality::Other(label),
        }
    }
}

impl Serialize for Criticality {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Criticality {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => Criticality::default(),
            other => Criticality::from(text(other)),
        })
    }
}

/// Pass/fail test of one telemetry field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Dotted path from the `{eva, ltv}` root
    pub path: String,
    /// Operator name; unknown names never pass
    #[serde(default = "default_op", deserialize_with = "op_or_default")]
    pub op: String,
    /// Comparison target. `None` when the catalog omits it, which is
    /// distinct from an explicit `null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

fn default_op() -> String {
    CompareOp::Eq.as_str().to_string()
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

fn op_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => default_op(),
        other => text(other),
    })
}

/// Free-text field: `null` is empty, non-strings keep their JSON spelling
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        other => text(other),
    })
}

fn lenient_title<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        other => Some(text(other)),
    })
}

fn text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl Criterion {
    pub fn new(path: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Criterion {
            path: path.into(),
            op: op.as_str().to_string(),
            value: Some(value),
        }
    }

    /// Resolve `path` against `state` and compare. Never fails.
    pub fn evaluate(&self, state: &Value) -> bool {
        tss_core::compare(&self.op, get_path(state, &self.path), self.value.as_ref())
    }
}

/// One checklist instruction
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub instruction: String,
    #[serde(default)]
    pub criticality: Criticality,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hint: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub voice_short: String,
    #[serde(default)]
    pub completion_criteria: Vec<Criterion>,
    /// Fields the engine does not interpret, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A checklist
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    #[serde(
        default,
        deserialize_with = "lenient_title",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Procedures of one namespace, in file order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Namespace {
    entries: Vec<(String, Procedure)>,
}

impl Namespace {
    pub fn get(&self, id: &str) -> Option<&Procedure> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Procedure)> {
        self.entries.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every namespace of the catalog file. Immutable once loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcedureCatalog {
    namespaces: Vec<(String, Namespace)>,
}

impl ProcedureCatalog {
    /// Read and validate a catalog file
    pub fn load(path: impl AsRef<Path>) -> TssResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| TssError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> TssResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TssError::CatalogLoad(e.to_string()))?;
        Self::from_value(value)
    }

    /// Build from a parsed document. The root must be an object, as must
    /// the `ltv` namespace when present; other top-level keys that are not
    /// objects are ignored. Procedures must have the checklist structure,
    /// but free-text step fields accept any value.
    pub fn from_value(value: Value) -> TssResult<Self> {
        let Value::Object(root) = value else {
            return Err(TssError::CatalogLoad(
                "procedure file must be a JSON object".into(),
            ));
        };

        let mut namespaces = Vec::with_capacity(root.len());
        for (name, procedures) in root {
            let procedures = match procedures {
                Value::Object(procedures) => procedures,
                _ if name == LTV_NAMESPACE => {
                    return Err(TssError::CatalogLoad(format!(
                        "namespace {:?} must be a JSON object",
                        name
                    )));
                }
                _ => {
                    tracing::debug!("ignoring non-namespace catalog key {:?}", name);
                    continue;
                }
            };

            let mut entries = Vec::with_capacity(procedures.len());
            for (id, procedure) in procedures {
                let procedure: Procedure = serde_json::from_value(procedure).map_err(|e| {
                    TssError::CatalogLoad(format!("procedure {}/{}: {}", name, id, e))
                })?;
                entries.push((id, procedure));
            }
            namespaces.push((name, Namespace { entries }));
        }

        Ok(ProcedureCatalog { namespaces })
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces
            .iter()
            .find(|(ns, _)| ns == name)
            .map(|(_, ns)| ns)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(|(name, _)| name.as_str())
    }

    /// Total number of procedures across namespaces
    pub fn len(&self) -> usize {
        self.namespaces.iter().map(|(_, ns)| ns.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
