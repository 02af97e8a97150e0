//! Click-behavior resolution.
//!
//! Maps a click on a dashboard element to at most one action:
//!
//! ```text
//!  column / card click_behavior
//!            │
//!       none │ some
//!   ◄────────┤
//!  no action │
//!            ▼
//!   link target fetched? ──no──► no action
//!            │ yes
//!            ▼
//!  ┌─────────┬───────────┬────────────────┬──────────────┐
//!  │crossfil.│ link/url  │ link/dashboard │ link/question│
//!  └────┬────┴─────┬─────┴───────┬────────┴──────┬───────┘
//!    effect   rendered     self: effect       public / ad-hoc
//!             template     other: URL         / saved URL
//! ```
//!
//! Resolution is pure: no I/O, no errors. Anything that cannot be resolved
//! yields `None` and the caller leaves the click alone.

mod mapping;

use drill_core::{ActionTarget, ClickBehavior, Clicked, Effect, ExtraData, ResolvedAction};

pub use mapping::{
    parameter_id_value_pairs, parameter_values_by_slug, question_parameters, type_for_source,
};

use crate::click_data::ClickData;
use crate::format::MappingContext;
use crate::link::render_link_url_for_click;
use crate::query_string::stringify;
use crate::question::{lock_display, public_question_url, url_with_parameters};

/// Resolve a click to its action, if any.
pub fn resolve(clicked: &Clicked) -> Option<ResolvedAction> {
    let behavior = clicked.click_behavior()?;

    if !has_link_target_data(behavior, clicked.extra_data.as_ref()) {
        tracing::debug!(?behavior, "Link target not in pre-fetched data, ignoring click");
        return None;
    }

    let default_extra = ExtraData::default();
    let extra = clicked.extra_data.as_ref().unwrap_or(&default_extra);
    let data = ClickData::from_clicked(clicked);
    let ctx = MappingContext {
        data: &data,
        extra,
        behavior,
    };

    let target = match behavior {
        ClickBehavior::Crossfilter { parameter_mapping } => Some(ActionTarget::Action(
            Effect::SetOrUnsetParameterValues(parameter_id_value_pairs(parameter_mapping, &ctx)),
        )),

        ClickBehavior::LinkUrl { link_template } => Some(ActionTarget::Url(
            render_link_url_for_click(link_template.as_deref().unwrap_or(""), &data),
        )),

        ClickBehavior::LinkDashboard {
            target_id,
            parameter_mapping,
            ..
        } if extra.dashboard.as_ref().map(|d| d.id) == Some(*target_id) => {
            Some(ActionTarget::Action(Effect::SetParameterValues(
                parameter_id_value_pairs(parameter_mapping, &ctx),
            )))
        }

        ClickBehavior::LinkDashboard {
            target_id,
            parameter_mapping,
            use_public_link,
        } => extra.dashboards.get(target_id).map(|dashboard| {
            let query = stringify(&parameter_values_by_slug(parameter_mapping, &ctx));
            let path = match dashboard.public_uuid.as_deref() {
                Some(uuid) if *use_public_link => format!("/public/dashboard/{}", uuid),
                _ => format!("/dashboard/{}", target_id),
            };
            ActionTarget::Url(format!("{}?{}", path, query))
        }),

        ClickBehavior::LinkQuestion {
            target_id,
            parameter_mapping,
            use_public_link,
        } => extra.questions.get(target_id).map(|card| {
            let card = lock_display(card);
            let values = parameter_values_by_slug(parameter_mapping, &ctx);
            let url = match card.public_uuid.as_deref() {
                Some(uuid) if *use_public_link => public_question_url(uuid, &values),
                _ => url_with_parameters(
                    &card,
                    &question_parameters(parameter_mapping, extra),
                    &values,
                ),
            };
            ActionTarget::Url(url)
        }),

        ClickBehavior::Unrecognized => None,
    };

    if target.is_none() {
        tracing::debug!(?behavior, "Click behavior resolved to no action");
    }
    target.map(ResolvedAction::from)
}

/// Actions for a click as a list of zero or one element.
pub fn click_behavior_actions(clicked: &Clicked) -> Vec<ResolvedAction> {
    resolve(clicked).into_iter().collect()
}

/// Whether the entity a link points at was fetched ahead of the click.
fn has_link_target_data(behavior: &ClickBehavior, extra: Option<&ExtraData>) -> bool {
    match behavior {
        ClickBehavior::LinkDashboard { target_id, .. } => {
            extra.is_some_and(|e| e.dashboards.contains_key(target_id))
        }
        ClickBehavior::LinkQuestion { target_id, .. } => {
            extra.is_some_and(|e| e.questions.contains_key(target_id))
        }
        ClickBehavior::Crossfilter { .. }
        | ClickBehavior::LinkUrl { .. }
        | ClickBehavior::Unrecognized => true,
    }
}
