//! Parameter-mapping evaluation.

use indexmap::IndexMap;
use serde_json::Value;

use drill_core::{
    ExtraData, MappingSource, MappingTarget, ParameterMapping, ParameterValuePair, SourceType,
};

use crate::format::MappingContext;
use crate::question::QuestionParameter;

/// `(parameter id, value)` for every mapping entry, unset entries included.
pub fn parameter_id_value_pairs(
    mapping: &ParameterMapping,
    ctx: &MappingContext<'_>,
) -> Vec<ParameterValuePair> {
    mapping
        .values()
        .map(|entry| {
            (
                entry.id.clone(),
                ctx.format_source_for_target(&entry.source, &entry.target),
            )
        })
        .collect()
}

/// Query-string parameters keyed by target slug. Entries without a value
/// or without a slug are dropped.
pub fn parameter_values_by_slug(
    mapping: &ParameterMapping,
    ctx: &MappingContext<'_>,
) -> IndexMap<String, Value> {
    mapping
        .values()
        .filter_map(|entry| {
            let value = ctx.format_source_for_target(&entry.source, &entry.target)?;
            let key = ctx.target_for_query_params(&entry.target)?;
            Some((key, value))
        })
        .collect()
}

/// Declared type of a source: the dashboard parameter's type for parameter
/// sources, `text` otherwise.
pub fn type_for_source(source: &MappingSource, extra: &ExtraData) -> String {
    if source.source_type != SourceType::Parameter {
        return "text".to_string();
    }
    extra
        .dashboard
        .as_ref()
        .and_then(|dashboard| dashboard.parameter(&source.id))
        .map(|p| p.parameter_type.clone())
        .unwrap_or_else(|| "text".to_string())
}

/// Parameters handed to a linked question, one per dimension target.
pub fn question_parameters(mapping: &ParameterMapping, extra: &ExtraData) -> Vec<QuestionParameter> {
    mapping
        .values()
        .map(|entry| QuestionParameter {
            id: entry.id.clone(),
            slug: entry.id.clone(),
            parameter_type: type_for_source(&entry.source, extra),
            target: match &entry.target {
                MappingTarget::Dimension { dimension, .. } => dimension.clone(),
                MappingTarget::Parameter { .. } | MappingTarget::Variable { .. } => Value::Null,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::Dashboard;
    use serde_json::json;

    #[test]
    fn test_type_for_source() {
        let extra: ExtraData = serde_json::from_value(json!({
            "dashboard": {
                "id": 1,
                "parameters": [{"id": "p1", "slug": "date", "type": "date/single"}]
            }
        }))
        .unwrap();

        let source = |source_type, id: &str| MappingSource {
            source_type,
            id: id.to_string(),
            name: None,
        };

        assert_eq!(type_for_source(&source(SourceType::Parameter, "p1"), &extra), "date/single");
        assert_eq!(type_for_source(&source(SourceType::Parameter, "p9"), &extra), "text");
        assert_eq!(type_for_source(&source(SourceType::Column, "p1"), &extra), "text");

        let no_dashboard = ExtraData {
            dashboard: None::<Dashboard>,
            ..extra
        };
        assert_eq!(
            type_for_source(&source(SourceType::Parameter, "p1"), &no_dashboard),
            "text"
        );
    }
}
