//! Resolved click actions and the effects they carry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name every click-behavior action is tagged with.
pub const CLICK_BEHAVIOR_ACTION: &str = "click_behavior";

/// A parameter id paired with the value to set, or `None` to unset it.
pub type ParameterValuePair = (String, Option<Value>);

/// A state change the caller applies to the current dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "pairs")]
pub enum Effect {
    /// Crossfilter update: set each value, or unset it when `None` or
    /// already active.
    SetOrUnsetParameterValues(Vec<ParameterValuePair>),

    /// Plain assignment, used when a dashboard links to itself.
    SetParameterValues(Vec<ParameterValuePair>),
}

/// What a resolved click does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ActionTarget {
    /// Dispatch a state change.
    Action(Effect),

    /// Navigate to a URL.
    Url(String),
}

/// The single action produced for a click.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedAction {
    /// Always [`CLICK_BEHAVIOR_ACTION`].
    pub name: String,

    /// Run without asking the user to pick from a menu.
    pub default_always: bool,

    #[serde(flatten)]
    pub target: ActionTarget,
}

impl ResolvedAction {
    pub fn action(effect: Effect) -> Self {
        Self::new(ActionTarget::Action(effect))
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(ActionTarget::Url(url.into()))
    }

    fn new(target: ActionTarget) -> Self {
        Self {
            name: CLICK_BEHAVIOR_ACTION.to_string(),
            default_always: true,
            target,
        }
    }

    /// The navigation target, if this is a URL action.
    pub fn as_url(&self) -> Option<&str> {
        match &self.target {
            ActionTarget::Url(url) => Some(url),
            ActionTarget::Action(_) => None,
        }
    }

    /// The effect, if this is a state-update action.
    pub fn as_effect(&self) -> Option<&Effect> {
        match &self.target {
            ActionTarget::Action(effect) => Some(effect),
            ActionTarget::Url(_) => None,
        }
    }
}

impl From<ActionTarget> for ResolvedAction {
    fn from(target: ActionTarget) -> Self {
        Self::new(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_action_serialization() {
        let action = ResolvedAction::url("/dashboard/3");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            json!({"name": "click_behavior", "default_always": true, "url": "/dashboard/3"})
        );
    }

    #[test]
    fn test_effect_action_serialization() {
        let action = ResolvedAction::action(Effect::SetOrUnsetParameterValues(vec![
            ("p1".to_string(), Some(json!("CA"))),
            ("p2".to_string(), None),
        ]));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"]["type"], "SetOrUnsetParameterValues");
        assert_eq!(json["action"]["pairs"], json!([["p1", "CA"], ["p2", null]]));
        assert!(action.as_url().is_none());
    }
}
