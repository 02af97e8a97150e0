//! Click-time context: the clicked element and the data fetched alongside it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::click_behavior::ClickBehavior;
use crate::entity::{Card, Dashboard, EntityId};

/// Result-set column metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,

    /// Temporal bucketing unit (`day`, `month`, ...), set for breakout columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Date, datetime and time columns.
    pub fn is_temporal(&self) -> bool {
        self.base_type.as_deref().is_some_and(|t| {
            t.starts_with("type/Date") || t.starts_with("type/Time") || t == "type/Temporal"
        })
    }

    /// Keys under which visualization settings store per-column entries,
    /// most specific first.
    pub fn settings_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(2);
        if let Some(field_ref) = &self.field_ref {
            keys.push(serde_json::json!(["ref", field_ref]).to_string());
        }
        keys.push(serde_json::json!(["name", self.name]).to_string());
        keys
    }
}

/// A column paired with its value in the clicked row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnValue {
    #[serde(alias = "col")]
    pub column: Column,

    #[serde(default)]
    pub value: Option<Value>,
}

/// Per-column visualization settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnSettings {
    #[serde(default)]
    pub click_behavior: Option<ClickBehavior>,
}

/// Visualization settings of the clicked card.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisualizationSettings {
    #[serde(default)]
    pub click_behavior: Option<ClickBehavior>,

    /// Keyed by [`Column::settings_keys`].
    #[serde(default)]
    pub column_settings: HashMap<String, ColumnSettings>,
}

impl VisualizationSettings {
    /// Settings entry for a column, if one exists.
    pub fn column(&self, column: &Column) -> Option<&ColumnSettings> {
        column
            .settings_keys()
            .iter()
            .find_map(|key| self.column_settings.get(key))
    }
}

/// Entities fetched before the click so resolution never blocks on I/O.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraData {
    /// The dashboard the click happened on.
    #[serde(default)]
    pub dashboard: Option<Dashboard>,

    /// Link-target dashboards by id.
    #[serde(default)]
    pub dashboards: HashMap<EntityId, Dashboard>,

    /// Link-target questions by id.
    #[serde(default)]
    pub questions: HashMap<EntityId, Card>,

    /// Current values of the dashboard's parameters, keyed by slug.
    #[serde(default)]
    pub parameter_values_by_slug: HashMap<String, Value>,

    /// Attributes of the signed-in user.
    #[serde(default)]
    pub user_attributes: HashMap<String, Value>,
}

/// Everything known about a single click.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clicked {
    /// Clicked value, if the click landed on a cell or data point.
    #[serde(default)]
    pub value: Option<Value>,

    #[serde(default)]
    pub column: Option<Column>,

    /// Breakout dimensions of the clicked data point.
    #[serde(default)]
    pub dimensions: Vec<ColumnValue>,

    /// Full row of the clicked data point.
    #[serde(default)]
    pub data: Vec<ColumnValue>,

    #[serde(default)]
    pub settings: VisualizationSettings,

    #[serde(default)]
    pub extra_data: Option<ExtraData>,
}

impl Clicked {
    /// Effective click behavior: the clicked column's entry wins over the
    /// card-wide one.
    pub fn click_behavior(&self) -> Option<&ClickBehavior> {
        self.column
            .as_ref()
            .and_then(|column| self.settings.column(column))
            .and_then(|s| s.click_behavior.as_ref())
            .or(self.settings.click_behavior.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_settings_take_precedence() {
        let clicked: Clicked = serde_json::from_value(json!({
            "column": {"name": "STATE"},
            "settings": {
                "click_behavior": {"type": "link", "linkType": "url", "linkTemplate": "/card"},
                "column_settings": {
                    "[\"name\",\"STATE\"]": {
                        "click_behavior": {"type": "link", "linkType": "url", "linkTemplate": "/column"}
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(
            clicked.click_behavior(),
            Some(&ClickBehavior::LinkUrl {
                link_template: Some("/column".to_string())
            })
        );
    }

    #[test]
    fn test_falls_back_to_card_behavior() {
        let clicked: Clicked = serde_json::from_value(json!({
            "column": {"name": "CITY"},
            "settings": {
                "click_behavior": {"type": "crossfilter", "parameterMapping": {}}
            }
        }))
        .unwrap();

        assert!(matches!(
            clicked.click_behavior(),
            Some(ClickBehavior::Crossfilter { .. })
        ));
    }

    #[test]
    fn test_no_behavior() {
        assert!(Clicked::default().click_behavior().is_none());
    }

    #[test]
    fn test_field_ref_settings_key() {
        let column = Column {
            field_ref: Some(json!(["field", 3, null])),
            ..Column::new("ID")
        };
        assert_eq!(
            column.settings_keys(),
            vec![
                "[\"ref\",[\"field\",3,null]]".to_string(),
                "[\"name\",\"ID\"]".to_string()
            ]
        );
    }

    #[test]
    fn test_extra_data_integer_keys() {
        let extra: ExtraData = serde_json::from_value(json!({
            "dashboards": {"12": {"id": 12, "public_uuid": "abc"}},
            "parameterValuesBySlug": {"state": "CA"}
        }))
        .unwrap();

        assert_eq!(extra.dashboards[&12].public_uuid.as_deref(), Some("abc"));
        assert_eq!(extra.parameter_values_by_slug["state"], json!("CA"));
    }

    #[test]
    fn test_temporal_columns() {
        assert!(Column::new("CREATED_AT")
            .with_base_type("type/DateTime")
            .is_temporal());
        assert!(Column::new("D").with_base_type("type/Date").is_temporal());
        assert!(!Column::new("TOTAL").with_base_type("type/Float").is_temporal());
        assert!(!Column::new("X").is_temporal());
    }
}
