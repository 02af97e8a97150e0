//! URLs for saved and ad-hoc questions.
//!
//! Saved questions live at `/question/<id>-<slug>`. Ad-hoc questions carry
//! their whole card in the URL fragment as base64-encoded JSON, which is how
//! a structured question opened with parameter filters is addressed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

use drill_core::{Card, DatasetQuery, EntityId};

use crate::query_string::stringify;

/// A parameter handed to a target question.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionParameter {
    pub id: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub parameter_type: String,
    /// Dimension reference, e.g. `["dimension", ["field", 4, null]]`.
    pub target: Value,
}

/// Card fields carried in an ad-hoc question URL.
#[derive(Debug, Serialize)]
struct SerializedCard<'a> {
    name: Option<&'a str>,
    dataset_query: &'a DatasetQuery,
    display: Option<&'a str>,
    #[serde(rename = "displayIsLocked", skip_serializing_if = "Option::is_none")]
    display_is_locked: Option<bool>,
    visualization_settings: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_card_id: Option<EntityId>,
}

/// Copy of `card` whose visualization type stays fixed.
pub fn lock_display(card: &Card) -> Card {
    Card {
        display_is_locked: Some(true),
        ..card.clone()
    }
}

/// URL slug for a question name.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Path of a card: `/question/<id>-<slug>` when saved, otherwise ad-hoc.
pub fn card_url(card: &Card) -> String {
    match card.id {
        Some(id) => match card.name.as_deref().map(slugify) {
            Some(slug) if !slug.is_empty() => format!("/question/{}-{}", id, slug),
            _ => format!("/question/{}", id),
        },
        None => adhoc_url(card, None),
    }
}

/// `/question#<base64 card>`.
pub fn adhoc_url(card: &Card, original_card_id: Option<EntityId>) -> String {
    let serialized = SerializedCard {
        name: card.name.as_deref(),
        dataset_query: &card.dataset_query,
        display: card.display.as_deref(),
        display_is_locked: card.display_is_locked,
        visualization_settings: &card.visualization_settings,
        original_card_id,
    };
    let json = serde_json::to_string(&serialized).unwrap_or_default();
    format!("/question#{}", STANDARD.encode(json))
}

/// `/public/question/<uuid>?<query>`.
pub fn public_question_url(uuid: &str, values: &IndexMap<String, Value>) -> String {
    format!("/public/question/{}?{}", uuid, stringify(values))
}

/// URL opening `card` with parameter values applied.
///
/// Structured questions get the values converted to filters and open
/// ad-hoc; native questions keep their saved URL with a query string.
pub fn url_with_parameters(
    card: &Card,
    parameters: &[QuestionParameter],
    values: &IndexMap<String, Value>,
) -> String {
    if !card.is_structured() {
        return format!("{}?{}", card_url(card), stringify(values));
    }

    let mut adhoc = card.clone();
    adhoc.id = None;
    if let Some(query) = adhoc.dataset_query.query.as_mut() {
        for parameter in parameters {
            let filter = values
                .get(&parameter.slug)
                .and_then(|value| parameter_filter(parameter, value));
            if let Some(filter) = filter {
                add_filter(query, filter);
            }
        }
    }
    tracing::debug!(card_id = ?card.id, "Opening question ad-hoc with parameter filters");
    adhoc_url(&adhoc, card.id)
}

/// Filter clause for a parameter value targeting a field dimension.
fn parameter_filter(parameter: &QuestionParameter, value: &Value) -> Option<Value> {
    let field = match parameter.target.as_array().map(Vec::as_slice) {
        Some([kind, field]) if kind == "dimension" => field.clone(),
        _ => return None,
    };

    let values = match value {
        Value::Null => return None,
        Value::Array(items) if items.is_empty() => return None,
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };

    if parameter.parameter_type.starts_with("date/") {
        if let [Value::String(s)] = values.as_slice() {
            if let Some((start, end)) = s.split_once('~') {
                return Some(json!(["between", field, start, end]));
            }
        }
    }

    let mut clause = vec![json!("="), field];
    clause.extend(values);
    Some(Value::Array(clause))
}

/// AND a filter into a structured query.
fn add_filter(query: &mut Map<String, Value>, filter: Value) {
    let combined = match query.remove("filter") {
        None | Some(Value::Null) => filter,
        Some(Value::Array(mut clauses)) if clauses.first() == Some(&json!("and")) => {
            clauses.push(filter);
            Value::Array(clauses)
        }
        Some(existing) => json!(["and", existing, filter]),
    };
    query.insert("filter".to_string(), combined);
}
