//! BI-server entities referenced by click behaviors and writeback actions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Numeric identifier used by dashboards, cards, tables, fields and segments.
pub type EntityId = u64;

/// A dashboard and the filter parameters it exposes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub id: EntityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Filter parameters shown on the dashboard.
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Set when the dashboard has been shared publicly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_uuid: Option<String>,
}

impl Dashboard {
    /// Find a parameter by id.
    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }
}

/// A dashboard filter parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// URL slug used as the query-string key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Parameter type, e.g. `category`, `date/month-year`.
    #[serde(rename = "type", default = "default_parameter_type")]
    pub parameter_type: String,
}

fn default_parameter_type() -> String {
    "text".to_string()
}

impl Parameter {
    /// Create a text parameter with a slug.
    pub fn new(id: impl Into<String>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: Some(slug.into()),
            parameter_type: default_parameter_type(),
        }
    }

    /// Set the parameter type.
    pub fn with_type(mut self, parameter_type: impl Into<String>) -> Self {
        self.parameter_type = parameter_type.into();
        self
    }
}

/// How a card's query is expressed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Structured (query builder) query.
    Query,
    /// Native SQL query.
    Native,
}

/// The query a card runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetQuery {
    #[serde(rename = "type")]
    pub query_type: QueryType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<EntityId>,

    /// Structured query body (`source-table`, `filter`, `aggregation`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,

    /// Native query body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<Value>,
}

/// A saved question (card).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Keeps the visualization type fixed when the query changes.
    #[serde(
        rename = "displayIsLocked",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_is_locked: Option<bool>,

    pub dataset_query: DatasetQuery,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub visualization_settings: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_uuid: Option<String>,
}

impl Card {
    pub fn is_structured(&self) -> bool {
        self.dataset_query.query_type == QueryType::Query
    }
}

/// A field (column) of a table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub id: EntityId,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
}

impl Field {
    pub fn is_pk(&self) -> bool {
        self.semantic_type.as_deref() == Some("type/PK")
    }

    /// Integer, float and decimal base types.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.base_type.as_deref(),
            Some(
                "type/Number"
                    | "type/Integer"
                    | "type/BigInteger"
                    | "type/Float"
                    | "type/Decimal"
            )
        )
    }

    /// MBQL reference to this field: `["field", id, null]`.
    pub fn reference(&self) -> Value {
        serde_json::json!(["field", self.id, null])
    }
}

/// A database table with its fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub id: EntityId,

    pub db_id: EntityId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Table {
    /// The first primary-key field, if any.
    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_pk())
    }
}

/// A saved segment (named filter) on a table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub id: EntityId,

    pub name: String,

    pub table_id: EntityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub archived: bool,

    /// Segment definition (an MBQL filter clause).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub definition: Value,
}
