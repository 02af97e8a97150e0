//! Lookup tables built from a click.
//!
//! Mapping sources and link templates refer to clicked columns, dashboard
//! parameters and user attributes by name. [`ClickData`] indexes all of them
//! once per click.

use std::collections::HashMap;

use drill_core::{Clicked, Column, SourceType};
use serde_json::Value;

/// A value available at click time, with its column when it came from one.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub value: Option<Value>,
    pub column: Option<Column>,
}

impl Datum {
    fn value(value: Value) -> Self {
        Self {
            value: Some(value),
            column: None,
        }
    }
}

/// Click values indexed by where they come from.
#[derive(Debug, Clone, Default)]
pub struct ClickData {
    /// Keyed by lower-cased column name.
    pub column: HashMap<String, Datum>,
    /// Keyed by parameter id.
    pub parameter: HashMap<String, Datum>,
    /// Keyed by lower-cased parameter name.
    pub parameter_by_name: HashMap<String, Datum>,
    /// Keyed by parameter slug.
    pub parameter_by_slug: HashMap<String, Datum>,
    /// Keyed by attribute name.
    pub user_attribute: HashMap<String, Datum>,
}

impl ClickData {
    /// Index the values of a click.
    ///
    /// Columns are taken from the breakout dimensions first, then the row,
    /// then the clicked cell; the first occurrence of a name wins.
    pub fn from_clicked(clicked: &Clicked) -> Self {
        let mut data = Self::default();

        let clicked_cell = clicked.column.as_ref().map(|column| (column, &clicked.value));
        let columns = clicked
            .dimensions
            .iter()
            .chain(clicked.data.iter())
            .map(|cv| (&cv.column, &cv.value))
            .chain(clicked_cell);

        for (column, value) in columns {
            data.column
                .entry(column.name.to_lowercase())
                .or_insert_with(|| Datum {
                    value: value.clone(),
                    column: Some(column.clone()),
                });
        }

        let Some(extra) = clicked.extra_data.as_ref() else {
            return data;
        };

        for (slug, value) in &extra.parameter_values_by_slug {
            if !value.is_null() {
                data.parameter_by_slug
                    .insert(slug.clone(), Datum::value(value.clone()));
            }
        }

        if let Some(dashboard) = &extra.dashboard {
            for parameter in &dashboard.parameters {
                let value = parameter
                    .slug
                    .as_ref()
                    .and_then(|slug| extra.parameter_values_by_slug.get(slug))
                    .filter(|v| !v.is_null());
                if let Some(value) = value {
                    data.parameter
                        .insert(parameter.id.clone(), Datum::value(value.clone()));
                    data.parameter_by_name.insert(
                        parameter.name.to_lowercase(),
                        Datum::value(value.clone()),
                    );
                }
            }
        }

        for (name, value) in &extra.user_attributes {
            data.user_attribute
                .insert(name.clone(), Datum::value(value.clone()));
        }

        data
    }

    /// Look up a mapping source.
    ///
    /// Column names match case-insensitively; other ids match exactly, then
    /// lower-cased.
    pub fn get(&self, source_type: SourceType, id: &str) -> Option<&Datum> {
        let table = match source_type {
            SourceType::Column => return self.column.get(&id.to_lowercase()),
            SourceType::Parameter => &self.parameter,
            SourceType::UserAttribute => &self.user_attribute,
        };
        table.get(id).or_else(|| table.get(&id.to_lowercase()))
    }

    /// Look up a template variable: columns, then parameter names, then
    /// parameter slugs, then user attributes.
    pub fn lookup_name(&self, name: &str) -> Option<&Datum> {
        let lower = name.to_lowercase();
        self.column
            .get(&lower)
            .or_else(|| self.parameter_by_name.get(&lower))
            .or_else(|| self.parameter_by_slug.get(name))
            .or_else(|| self.user_attribute.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clicked() -> Clicked {
        serde_json::from_value(json!({
            "value": 42,
            "column": {"name": "Total"},
            "dimensions": [
                {"column": {"name": "STATE"}, "value": "CA"}
            ],
            "data": [
                {"col": {"name": "State"}, "value": "ignored"},
                {"col": {"name": "CITY"}, "value": null}
            ],
            "extraData": {
                "dashboard": {
                    "id": 1,
                    "parameters": [
                        {"id": "p1", "name": "Category", "slug": "category"},
                        {"id": "p2", "name": "Vendor", "slug": "vendor"}
                    ]
                },
                "parameterValuesBySlug": {"category": "Gizmo", "vendor": null},
                "userAttributes": {"region": "west"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_columns_first_occurrence_wins() {
        let data = ClickData::from_clicked(&clicked());

        assert_eq!(data.column["state"].value, Some(json!("CA")));
        assert_eq!(data.column["city"].value, None);
        assert_eq!(data.column["total"].value, Some(json!(42)));
        assert_eq!(
            data.get(SourceType::Column, "STATE").unwrap().column.as_ref().unwrap().name,
            "STATE"
        );
    }

    #[test]
    fn test_parameters_only_with_values() {
        let data = ClickData::from_clicked(&clicked());

        assert_eq!(data.parameter["p1"].value, Some(json!("Gizmo")));
        assert!(!data.parameter.contains_key("p2"));
        assert_eq!(data.parameter_by_name["category"].value, Some(json!("Gizmo")));
        assert!(!data.parameter_by_slug.contains_key("vendor"));
    }

    #[test]
    fn test_lookup_name_order() {
        let data = ClickData::from_clicked(&clicked());

        assert_eq!(data.lookup_name("City").unwrap().value, None);
        assert_eq!(data.lookup_name("CATEGORY").unwrap().value, Some(json!("Gizmo")));
        assert_eq!(data.lookup_name("region").unwrap().value, Some(json!("west")));
        assert!(data.lookup_name("missing").is_none());
    }

    #[test]
    fn test_without_extra_data() {
        let data = ClickData::from_clicked(&Clicked::default());
        assert!(data.column.is_empty());
        assert!(data.user_attribute.is_empty());
    }
}
