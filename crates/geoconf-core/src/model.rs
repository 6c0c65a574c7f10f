//! Request and result shapes consumed by the confidence stage.
//!
//! Upstream collaborators hand us loosely shaped JSON: admin and address
//! properties may be a string, a number, or a list of either. Everything is
//! normalized here, at the ingestion boundary, into [`FieldValues`] so the
//! scorers only ever see ordered lists of strings.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Name of the hit group holding street-level address data.
pub const ADDRESS_PARTS: &str = "address_parts";
/// Name of the hit group holding the administrative hierarchy.
pub const PARENT: &str = "parent";

// ---------------------------------------------------------------------------
// FieldValues
// ---------------------------------------------------------------------------

/// One or more string values of a hit property.
///
/// Numbers keep their JSON text form (`10` becomes `"10"`). A value that was
/// a scalar on input is written back as a scalar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: Vec<String>,
    list: bool,
}

impl FieldValues {
    /// A single scalar value.
    #[must_use]
    pub fn one(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
            list: false,
        }
    }

    /// A list of values.
    #[must_use]
    pub fn many<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            list: true,
        }
    }

    pub fn iter(&self) -> FieldValuesIter<'_> {
        self.into_iter()
    }

    /// First value, the one used for tie-break comparisons.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the value arrived as a list rather than a scalar.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        self.list
    }
}

/// Borrowing iterator over the values of a [`FieldValues`].
pub type FieldValuesIter<'a> = std::iter::Map<std::slice::Iter<'a, String>, fn(&String) -> &str>;

impl<'a> IntoIterator for &'a FieldValues {
    type Item = &'a str;
    type IntoIter = FieldValuesIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter().map(String::as_str as fn(&String) -> &str)
    }
}

impl From<&str> for FieldValues {
    fn from(value: &str) -> Self {
        Self::one(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValues {
    Many(Vec<Option<Scalar>>),
    One(Option<Scalar>),
}

impl<'de> Deserialize<'de> for FieldValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawValues::deserialize(deserializer).map_err(|_| {
            de::Error::custom("expected a string, a number, or a list of strings/numbers")
        })?;
        Ok(match raw {
            RawValues::Many(items) => Self {
                values: items.into_iter().flatten().map(Scalar::into_string).collect(),
                list: true,
            },
            RawValues::One(item) => Self {
                values: item.map(Scalar::into_string).into_iter().collect(),
                list: false,
            },
        })
    }
}

impl Serialize for FieldValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (self.list, self.values.as_slice()) {
            (false, [single]) => serializer.serialize_str(single),
            (false, []) => serializer.serialize_none(),
            _ => self.values.serialize(serializer),
        }
    }
}

/// A hit group such as `parent` or `address_parts`.
pub type FieldGroup = BTreeMap<String, FieldValues>;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Structured interpretation of the user's input, produced upstream.
///
/// Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub postalcode: Option<String>,
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Admin region names; the first entry is conventionally the place name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
    /// Parser output this stage does not model explicitly. Address parts
    /// configured under other keys are looked up here.
    #[serde(flatten)]
    pub other: BTreeMap<String, ExtraField>,
}

impl ParsedQuery {
    /// Look up a query field by its address-part key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        let typed = match key {
            "number" => &self.number,
            "street" => &self.street,
            "postalcode" => &self.postalcode,
            "state" => &self.state,
            "country" => &self.country,
            "name" => &self.name,
            _ => {
                return self.other.get(key).and_then(ExtraField::as_text);
            }
        };
        typed.as_deref().filter(|s| !s.is_empty())
    }
}

/// A parser field without a typed slot. Strings and numbers read as text;
/// any other JSON is carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraField {
    raw: Value,
    text: Option<String>,
}

impl ExtraField {
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }

    /// Text form of a string or number; `None` for empty strings and other
    /// JSON kinds.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|s| !s.is_empty())
    }
}

impl From<Value> for ExtraField {
    fn from(raw: Value) -> Self {
        let text = match &raw {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        Self { raw, text }
    }
}

impl<'de> Deserialize<'de> for ExtraField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for ExtraField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Scalar>::deserialize(deserializer)
        .map_err(|_| de::Error::custom("expected a string or a number"))?;
    Ok(raw.map(Scalar::into_string).filter(|s| !s.is_empty()))
}

/// The cleaned request: raw text plus the optional parser output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_text: Option<ParsedQuery>,
}

impl Query {
    #[must_use]
    pub fn new(text: impl Into<String>, parsed_text: Option<ParsedQuery>) -> Self {
        Self {
            text: text.into(),
            parsed_text,
        }
    }

    /// Raw input text, lower-cased.
    #[must_use]
    pub fn lowercase_text(&self) -> String {
        self.text.to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// ResultHit
// ---------------------------------------------------------------------------

/// One candidate document returned by the search engine.
///
/// Fields this stage does not interpret are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultHit {
    /// Display names keyed by language code (`default`, `en`, `fi`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_parts: Option<FieldGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FieldGroup>,
    /// Raw engine relevance score.
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Set by the confidence stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultHit {
    /// Resolve a hit group by name. Only `address_parts` and `parent` exist.
    #[must_use]
    pub fn group(&self, key: &str) -> Option<&FieldGroup> {
        match key {
            ADDRESS_PARTS => self.address_parts.as_ref(),
            PARENT => self.parent.as_ref(),
            _ => None,
        }
    }

    /// Read `field` from the group named `group`.
    ///
    /// A null or empty-string scalar is absent. A list is present even when
    /// empty.
    #[must_use]
    pub fn lookup(&self, group: &str, field: &str) -> Option<&FieldValues> {
        self.group(group)?
            .get(field)
            .filter(|v| v.is_list() || v.first().is_some_and(|s| !s.is_empty()))
    }

    #[must_use]
    pub fn address_part(&self, field: &str) -> Option<&FieldValues> {
        self.lookup(ADDRESS_PARTS, field)
    }

    #[must_use]
    pub fn parent_field(&self, field: &str) -> Option<&FieldValues> {
        self.lookup(PARENT, field)
    }

    #[must_use]
    pub fn default_name(&self) -> Option<&str> {
        self.name.as_ref()?.get("default").map(String::as_str)
    }

    /// Confidence assigned by the stage; unscored hits rank as zero.
    #[must_use]
    pub fn confidence_or_zero(&self) -> f64 {
        self.confidence.unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Request envelope
// ---------------------------------------------------------------------------

/// Batch metadata; `scores` runs parallel to the result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMeta {
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything the stage reads for one request. Any missing piece turns the
/// stage into a pass-through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ResultHit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BatchMeta>,
}
