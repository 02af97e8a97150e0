//! Click-behavior configuration.
//!
//! Dashboards store click behaviors as loosely tagged JSON (`type` plus an
//! optional `linkType`). On deserialization the tags are folded into a closed
//! [`ClickBehavior`] enum with one variant per supported combination.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::EntityId;

/// Mapping from parameter id to the source/target pair feeding it.
///
/// Insertion order is preserved.
pub type ParameterMapping = IndexMap<String, MappingEntry>;

/// One entry of a [`ParameterMapping`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingEntry {
    pub id: String,
    pub source: MappingSource,
    pub target: MappingTarget,
}

/// Where a mapped value comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceType {
    #[serde(rename = "column")]
    Column,
    #[serde(rename = "parameter")]
    Parameter,
    #[serde(rename = "userAttribute")]
    UserAttribute,
}

/// Source of a mapped value: a clicked column, a dashboard parameter or a
/// user attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingSource {
    #[serde(rename = "type")]
    pub source_type: SourceType,

    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Where a mapped value goes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MappingTarget {
    /// A dashboard filter parameter.
    Parameter { id: String },

    /// A dimension of a target question, e.g. `["dimension", ["field", 4, null]]`.
    Dimension { id: String, dimension: Value },

    /// A template tag of a native target question.
    Variable { id: String },
}

impl MappingTarget {
    pub fn id(&self) -> &str {
        match self {
            MappingTarget::Parameter { id }
            | MappingTarget::Dimension { id, .. }
            | MappingTarget::Variable { id } => id,
        }
    }
}

/// What happens when a dashboard element is clicked.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ClickBehavior {
    /// Push the clicked value into the current dashboard's filters.
    Crossfilter { parameter_mapping: ParameterMapping },

    /// Navigate to a URL rendered from a user-authored template.
    LinkUrl { link_template: Option<String> },

    /// Navigate to a dashboard (possibly the current one).
    LinkDashboard {
        target_id: EntityId,
        parameter_mapping: ParameterMapping,
        use_public_link: bool,
    },

    /// Navigate to a saved question.
    LinkQuestion {
        target_id: EntityId,
        parameter_mapping: ParameterMapping,
        use_public_link: bool,
    },

    /// Any tag combination not listed above. Resolves to no action.
    Unrecognized,
}

impl ClickBehavior {
    /// Dashboard whose parameters mapping targets refer to.
    ///
    /// `None` means the current dashboard.
    pub fn target_dashboard_id(&self) -> Option<EntityId> {
        match self {
            ClickBehavior::LinkDashboard { target_id, .. } => Some(*target_id),
            _ => None,
        }
    }

    pub fn parameter_mapping(&self) -> Option<&ParameterMapping> {
        match self {
            ClickBehavior::Crossfilter { parameter_mapping }
            | ClickBehavior::LinkDashboard {
                parameter_mapping, ..
            }
            | ClickBehavior::LinkQuestion {
                parameter_mapping, ..
            } => Some(parameter_mapping),
            ClickBehavior::LinkUrl { .. } | ClickBehavior::Unrecognized => None,
        }
    }
}

/// Entries that fail to decode (unknown source or target kinds) are dropped.
fn lenient_mapping(raw: Option<&Value>) -> ParameterMapping {
    let Some(Value::Object(entries)) = raw else {
        return ParameterMapping::new();
    };
    entries
        .iter()
        .filter_map(|(key, entry)| {
            let entry = MappingEntry::deserialize(entry).ok()?;
            Some((key.clone(), entry))
        })
        .collect()
}

impl From<Value> for ClickBehavior {
    /// Any shape is accepted. Tags that do not name a supported combination,
    /// or a link without a numeric `targetId`, give [`ClickBehavior::Unrecognized`].
    fn from(raw: Value) -> Self {
        let field = |name: &str| raw.get(name);
        let text = |name: &str| field(name).and_then(Value::as_str);

        let parameter_mapping = lenient_mapping(field("parameterMapping"));
        let use_public_link = field("use_public_link")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let target_id = field("targetId").and_then(Value::as_u64);

        match (text("type"), text("linkType"), target_id) {
            (Some("crossfilter"), _, _) => ClickBehavior::Crossfilter { parameter_mapping },
            (Some("link"), Some("url"), _) => ClickBehavior::LinkUrl {
                link_template: text("linkTemplate").map(str::to_string),
            },
            (Some("link"), Some("dashboard"), Some(target_id)) => ClickBehavior::LinkDashboard {
                target_id,
                parameter_mapping,
                use_public_link,
            },
            (Some("link"), Some("question"), Some(target_id)) => ClickBehavior::LinkQuestion {
                target_id,
                parameter_mapping,
                use_public_link,
            },
            _ => ClickBehavior::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_crossfilter_keeps_mapping_order() {
        let behavior: ClickBehavior = serde_json::from_value(json!({
            "type": "crossfilter",
            "parameterMapping": {
                "p2": {"id": "p2", "source": {"type": "column", "id": "STATE"}, "target": {"type": "parameter", "id": "p2"}},
                "p1": {"id": "p1", "source": {"type": "column", "id": "CITY"}, "target": {"type": "parameter", "id": "p1"}}
            }
        }))
        .unwrap();

        let mapping = behavior.parameter_mapping().unwrap();
        let keys: Vec<_> = mapping.keys().cloned().collect();
        assert_eq!(keys, vec!["p2", "p1"]);
        assert_eq!(mapping["p1"].source.source_type, SourceType::Column);
    }

    #[test]
    fn test_link_dashboard() {
        let behavior: ClickBehavior = serde_json::from_value(json!({
            "type": "link",
            "linkType": "dashboard",
            "targetId": 7,
            "use_public_link": true
        }))
        .unwrap();

        assert_eq!(
            behavior,
            ClickBehavior::LinkDashboard {
                target_id: 7,
                parameter_mapping: ParameterMapping::new(),
                use_public_link: true,
            }
        );
        assert_eq!(behavior.target_dashboard_id(), Some(7));
    }

    #[test]
    fn test_dimension_target() {
        let entry: MappingEntry = serde_json::from_value(json!({
            "id": "[\"dimension\",[\"field\",4,null]]",
            "source": {"type": "userAttribute", "id": "region", "name": "region"},
            "target": {"type": "dimension", "id": "[\"dimension\",[\"field\",4,null]]", "dimension": ["dimension", ["field", 4, null]]}
        }))
        .unwrap();

        assert_eq!(entry.source.source_type, SourceType::UserAttribute);
        assert!(matches!(entry.target, MappingTarget::Dimension { .. }));
        assert_eq!(entry.target.id(), "[\"dimension\",[\"field\",4,null]]");
    }

    #[test]
    fn test_variable_target() {
        let target: MappingTarget =
            serde_json::from_value(json!({"type": "variable", "id": "category"})).unwrap();
        assert_eq!(
            target,
            MappingTarget::Variable {
                id: "category".to_string()
            }
        );
        assert_eq!(target.id(), "category");
    }

    #[test]
    fn test_unknown_entry_kinds_are_dropped() {
        let behavior: ClickBehavior = serde_json::from_value(json!({
            "type": "link",
            "linkType": "question",
            "targetId": 4,
            "parameterMapping": {
                "tag": {"id": "tag", "source": {"type": "column", "id": "CITY"}, "target": {"type": "variable", "id": "tag"}},
                "odd": {"id": "odd", "source": {"type": "column", "id": "CITY"}, "target": {"type": "text-tag", "id": "odd"}},
                "who": {"id": "who", "source": {"type": "sessionAttribute", "id": "x"}, "target": {"type": "variable", "id": "who"}}
            }
        }))
        .unwrap();

        let keys: Vec<_> = behavior.parameter_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["tag"]);
    }

    #[test]
    fn test_malformed_fields_do_not_fail() {
        let behavior: ClickBehavior = serde_json::from_value(json!({
            "type": "link",
            "linkType": "dashboard",
            "targetId": "seven",
            "parameterMapping": []
        }))
        .unwrap();
        assert_eq!(behavior, ClickBehavior::Unrecognized);

        let behavior: ClickBehavior = serde_json::from_value(json!("crossfilter")).unwrap();
        assert_eq!(behavior, ClickBehavior::Unrecognized);
    }

    #[test]
    fn test_unrecognized_combinations() {
        for raw in [
            json!({"type": "link"}),
            json!({"type": "link", "linkType": "dashboard"}),
            json!({"type": "link", "linkType": "carrier-pigeon", "targetId": 1}),
            json!({"type": "actionMenu"}),
            json!({}),
        ] {
            let behavior: ClickBehavior = serde_json::from_value(raw).unwrap();
            assert_eq!(behavior, ClickBehavior::Unrecognized);
        }
    }
}
