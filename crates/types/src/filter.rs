//! Query and filter types accepted by the resolution entry points.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

/// How a requested service name is compared against catalog keys.
#[derive(Debug, Clone)]
pub enum NamePattern {
    Literal(String),
    Regex(Regex),
}

impl NamePattern {
    pub fn literal(name: impl Into<String>) -> Self {
        Self::Literal(name.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Regex)
    }

    /// The literal name, if this pattern is not a regular expression.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(name) => Some(name),
            Self::Regex(_) => None,
        }
    }

    /// True for a blank literal, which callers treat as "no pattern".
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Literal(name) if name.trim().is_empty())
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(left), Self::Literal(right)) => left == right,
            (Self::Regex(left), Self::Regex(right)) => left.as_str() == right.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(name) => write!(f, "{name}"),
            Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for NamePattern {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for NamePattern {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<Regex> for NamePattern {
    fn from(value: Regex) -> Self {
        Self::Regex(value)
    }
}

/// Positional lookup: service pattern plus optional plan, instance name and tag.
///
/// Blank strings are treated as absent by every setter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialQuery {
    pub service: Option<NamePattern>,
    pub plan: Option<String>,
    pub instance_name: Option<String>,
    pub tag: Option<String>,
}

impl CredentialQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(mut self, service: impl Into<NamePattern>) -> Self {
        let pattern = service.into();
        self.service = (!pattern.is_blank()).then_some(pattern);
        self
    }

    pub fn plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = non_blank(plan.into());
        self
    }

    pub fn instance_name(mut self, instance_name: impl Into<String>) -> Self {
        self.instance_name = non_blank(instance_name.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = non_blank(tag.into());
        self
    }

    /// True when no criterion at all was supplied.
    pub fn is_empty(&self) -> bool {
        self.service.is_none() && self.plan.is_none() && self.instance_name.is_none() && self.tag.is_none()
    }
}

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

/// Instance field addressable by an [`InstanceFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstanceField {
    Name,
    Label,
    Plan,
    Tags,
    Other(String),
}

impl InstanceField {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name => "name",
            Self::Label => "label",
            Self::Plan => "plan",
            Self::Tags => "tags",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for InstanceField {
    fn from(value: &str) -> Self {
        match value {
            "name" => Self::Name,
            "label" => Self::Label,
            "plan" => Self::Plan,
            "tags" => Self::Tags,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for InstanceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected instance field values; all of them must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceFilter {
    criteria: IndexMap<InstanceField, Value>,
}

impl InstanceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.field(InstanceField::Name, Value::String(name.into()))
    }

    pub fn label(self, label: impl Into<String>) -> Self {
        self.field(InstanceField::Label, Value::String(label.into()))
    }

    pub fn plan(self, plan: impl Into<String>) -> Self {
        self.field(InstanceField::Plan, Value::String(plan.into()))
    }

    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.field(InstanceField::Tags, Value::String(tag.into()))
    }

    /// Adds (or replaces) a criterion; `null` values are ignored.
    pub fn field(mut self, field: impl Into<InstanceField>, expected: impl Into<Value>) -> Self {
        let expected = expected.into();
        if !expected.is_null() {
            self.criteria.insert(field.into(), expected);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn get(&self, field: &InstanceField) -> Option<&Value> {
        self.criteria.get(field)
    }

    /// The requested instance name, when given as a string.
    pub fn instance_name(&self) -> Option<&str> {
        self.get(&InstanceField::Name).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InstanceField, &Value)> {
        self.criteria.iter()
    }
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for InstanceFilter {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |filter, (field, expected)| filter.field(InstanceField::from(field.as_ref()), expected))
    }
}

/// Structured filter for the filter-based finder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialFilter {
    pub service: Option<NamePattern>,
    pub instance: InstanceFilter,
}

impl CredentialFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(mut self, service: impl Into<NamePattern>) -> Self {
        let pattern = service.into();
        self.service = (!pattern.is_blank()).then_some(pattern);
        self
    }

    pub fn instance(mut self, instance: InstanceFilter) -> Self {
        self.instance = instance;
        self
    }
}
