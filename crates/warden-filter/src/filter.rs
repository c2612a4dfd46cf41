//! Filter value object
//!
//! `(source, field, operator)` is the group key: the unit of replacement
//! when a panel re-submits. `(source, field, operator, value)` is the value
//! key identifying one concrete filter instance.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Wire operator. Unknown operators are carried verbatim and treated as
/// additive by the default merge policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Gte,
    Lte,
    In,
    Like,
    Eq,
    Equals,
    Other(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::In => "in",
            Operator::Like => "like",
            Operator::Eq => "=",
            Operator::Equals => "equals",
            Operator::Other(s) => s,
        }
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        match s {
            ">=" => Operator::Gte,
            "<=" => Operator::Lte,
            "in" => Operator::In,
            "like" => Operator::Like,
            "=" => Operator::Eq,
            "equals" => Operator::Equals,
            other => Operator::Other(other.to_string()),
        }
    }
}

impl FromStr for Operator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Operator::from(s))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Operator::from(s.as_str()))
    }
}

/// Concrete filter value shapes the client actually sends: nothing, an
/// integer (enum option ids), a string (text, money and ISO dates travel
/// as canonical strings), or a string list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(v: Vec<String>) -> Self {
        FilterValue::List(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Joined entity/table the filter applies to.
    pub source: String,
    pub field: Option<String>,
    pub operator: Operator,
    pub value: FilterValue,
    /// Human-readable rendering for filter chips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Filter {
    pub fn new(
        source: impl Into<String>,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            source: source.into(),
            field: Some(field.into()),
            operator,
            value: value.into(),
            display: None,
        }
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn group_key(&self) -> String {
        format!(
            "{}::{}::{}",
            self.source,
            self.field.as_deref().unwrap_or(""),
            self.operator
        )
    }

    pub fn value_key(&self) -> String {
        let value = serde_json::to_string(&self.value).unwrap_or_default();
        format!("{}::{}", self.group_key(), value)
    }
}
