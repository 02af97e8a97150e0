//! Formatting mapped source values for their targets.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use drill_core::{ClickBehavior, ExtraData, MappingSource, MappingTarget, Parameter};
use serde_json::Value;

use crate::click_data::ClickData;

/// Everything needed to turn a mapping entry into a value.
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    pub data: &'a ClickData,
    pub extra: &'a ExtraData,
    pub behavior: &'a ClickBehavior,
}

impl<'a> MappingContext<'a> {
    /// Parameters that `parameter` targets refer to.
    ///
    /// Dashboard links target the linked dashboard; everything else targets
    /// the current one.
    pub fn target_parameters(&self) -> &'a [Parameter] {
        let dashboard = match self.behavior.target_dashboard_id() {
            Some(id) => self.extra.dashboards.get(&id),
            None => self.extra.dashboard.as_ref(),
        };
        dashboard.map(|d| d.parameters.as_slice()).unwrap_or(&[])
    }

    /// The parameter a target points at, if it is a parameter target.
    pub fn target_parameter(&self, target: &MappingTarget) -> Option<&'a Parameter> {
        match target {
            MappingTarget::Parameter { id } => self.target_parameters().iter().find(|p| &p.id == id),
            MappingTarget::Dimension { .. } | MappingTarget::Variable { .. } => None,
        }
    }

    /// Query-string key for a target: the parameter's slug, or the
    /// dimension or template-tag id.
    pub fn target_for_query_params(&self, target: &MappingTarget) -> Option<String> {
        match target {
            MappingTarget::Parameter { .. } => {
                self.target_parameter(target).and_then(|p| p.slug.clone())
            }
            MappingTarget::Dimension { id, .. } | MappingTarget::Variable { id } => {
                Some(id.clone())
            }
        }
    }

    /// Value of `source` formatted for `target`. `None` when the source has
    /// no value.
    pub fn format_source_for_target(
        &self,
        source: &MappingSource,
        target: &MappingTarget,
    ) -> Option<Value> {
        let datum = self.data.get(source.source_type, &source.id)?;
        let value = datum.value.as_ref().filter(|v| !v.is_null())?;

        let Some(column) = datum.column.as_ref().filter(|c| c.is_temporal()) else {
            return Some(value.clone());
        };
        let unit = column.unit.as_deref();

        let formatted = match target {
            MappingTarget::Parameter { .. } => {
                let parameter_type = self
                    .target_parameter(target)
                    .map(|p| p.parameter_type.as_str());
                format_date_for_parameter_type(value, parameter_type, unit)
            }
            MappingTarget::Dimension { .. } | MappingTarget::Variable { .. } => {
                Some(format_date_time_for_parameter(value, unit))
            }
        };
        Some(formatted.unwrap_or_else(|| value.clone()))
    }
}

/// Parse the date part of an ISO-8601 value as written, keeping any offset.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn invalid(value: &Value) -> Value {
    Value::String(crate::query_string::scalar_to_string(value))
}

fn quarter(date: NaiveDate) -> String {
    format!("Q{}-{}", date.month0() / 3 + 1, date.year())
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{}~{}", day(start), day(end))
}

/// Format a date for a date parameter of the given type.
///
/// Returns `None` for parameter types that take the raw value.
fn format_date_for_parameter_type(
    value: &Value,
    parameter_type: Option<&str>,
    unit: Option<&str>,
) -> Option<Value> {
    let formatted = match parameter_type? {
        "date/month-year" => parse_date(value).map(|d| d.format("%Y-%m").to_string()),
        "date/quarter-year" => parse_date(value).map(quarter),
        "date/single" => parse_date(value).map(day),
        "date/all-options" => return Some(format_date_time_for_parameter(value, unit)),
        _ => return None,
    };
    Some(formatted.map(Value::String).unwrap_or_else(|| invalid(value)))
}

/// Format a date bucketed by `unit` as a parameter value.
///
/// Units wider than a day produce a `start~end` range.
pub fn format_date_time_for_parameter(value: &Value, unit: Option<&str>) -> Value {
    let Some(date) = parse_date(value) else {
        return invalid(value);
    };

    let formatted = match unit {
        Some("month") => date.format("%Y-%m").to_string(),
        Some("quarter") => quarter(date),
        Some("week") => {
            let offset = Duration::days(i64::from(date.weekday().num_days_from_sunday()));
            let start = date.checked_sub_signed(offset);
            match start.zip(start.and_then(|s| s.checked_add_signed(Duration::days(6)))) {
                Some((start, end)) => range(start, end),
                // Week runs past the representable calendar.
                None => day(date),
            }
        }
        Some("year") => match (
            NaiveDate::from_ymd_opt(date.year(), 1, 1),
            NaiveDate::from_ymd_opt(date.year(), 12, 31),
        ) {
            (Some(start), Some(end)) => range(start, end),
            _ => day(date),
        },
        _ => day(date),
    };
    Value::String(formatted)
}
