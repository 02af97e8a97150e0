//! Rendering user-authored link templates.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::click_data::ClickData;
use crate::query_string::{encode_uri_component, scalar_to_string};

static TEMPLATE_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid template regex"));

/// Substitute `{{name}}` placeholders with click values.
///
/// `format` turns a value into its replacement text. Unknown names render
/// as empty strings.
pub fn render_template_for_click<F>(template: &str, data: &ClickData, format: F) -> String
where
    F: Fn(&str) -> String,
{
    TEMPLATE_VARIABLE
        .replace_all(template, |caps: &Captures| {
            let name = caps[1].trim();
            match data.lookup_name(name) {
                Some(datum) => {
                    let text = datum
                        .value
                        .as_ref()
                        .map(scalar_to_string)
                        .unwrap_or_default();
                    format(&text)
                }
                None => {
                    tracing::warn!("Missing value for template variable: {}", name);
                    String::new()
                }
            }
        })
        .into_owned()
}

/// Render a URL template, percent-encoding each substituted value.
pub fn render_link_url_for_click(template: &str, data: &ClickData) -> String {
    render_template_for_click(template, data, encode_uri_component)
}
