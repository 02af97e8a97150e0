//! Observable dashboard parameter values.
//!
//! Every mutation broadcasts the new values. Callers cannot change a
//! parameter without notifying subscribers.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::watch;

use drill_core::{Effect, EntityId, ExtraData};

/// Parameter values keyed by parameter id.
pub type ParameterValues = IndexMap<String, Value>;

/// Parameter values of the dashboard currently on screen.
///
/// ## Thread Safety
///
/// Uses `parking_lot::RwLock` for the values (never poisons) and
/// `tokio::sync::watch` for broadcasts.
pub struct DashboardState {
    dashboard_id: EntityId,
    inner: RwLock<ParameterValues>,
    tx: watch::Sender<ParameterValues>,
    rx: watch::Receiver<ParameterValues>,
}

impl DashboardState {
    /// Create an empty state for a dashboard.
    pub fn new(dashboard_id: EntityId) -> Self {
        Self::with_values(dashboard_id, ParameterValues::new())
    }

    /// Create a state holding `values`.
    pub fn with_values(dashboard_id: EntityId, values: ParameterValues) -> Self {
        let (tx, rx) = watch::channel(values.clone());
        Self {
            dashboard_id,
            inner: RwLock::new(values),
            tx,
            rx,
        }
    }

    /// Seed from the current dashboard in a click's pre-fetched data.
    ///
    /// Values are stored by slug in `extra`; they are re-keyed by parameter id.
    pub fn from_extra_data(extra: &ExtraData) -> Option<Self> {
        let dashboard = extra.dashboard.as_ref()?;
        let values = dashboard
            .parameters
            .iter()
            .filter_map(|p| {
                let value = extra.parameter_values_by_slug.get(p.slug.as_ref()?)?;
                (!value.is_null()).then(|| (p.id.clone(), value.clone()))
            })
            .collect();
        Some(Self::with_values(dashboard.id, values))
    }

    pub fn dashboard_id(&self) -> EntityId {
        self.dashboard_id
    }

    /// Subscribe to value changes.
    pub fn subscribe(&self) -> watch::Receiver<ParameterValues> {
        self.rx.clone()
    }

    /// Snapshot of the current values.
    pub fn values(&self) -> ParameterValues {
        self.inner.read().clone()
    }

    pub fn value(&self, id: &str) -> Option<Value> {
        self.inner.read().get(id).cloned()
    }

    // =========================================================================
    // Mutation Methods (all broadcast automatically)
    // =========================================================================

    /// Set a parameter, or remove it when `value` is `None`.
    pub fn set_parameter_value(&self, id: &str, value: Option<Value>) {
        let snapshot = {
            let mut inner = self.inner.write();
            Self::assign(&mut inner, id, value);
            inner.clone()
        };
        let _ = self.tx.send(snapshot);
    }

    /// Apply a resolved click effect. Broadcasts once.
    pub fn apply(&self, effect: &Effect) {
        let snapshot = {
            let mut inner = self.inner.write();
            match effect {
                Effect::SetOrUnsetParameterValues(pairs) => {
                    for (id, value) in pairs {
                        // Clicking the active value again clears it.
                        let next = value.clone().filter(|v| inner.get(id) != Some(v));
                        Self::assign(&mut inner, id, next);
                    }
                }
                Effect::SetParameterValues(pairs) => {
                    for (id, value) in pairs {
                        Self::assign(&mut inner, id, value.clone());
                    }
                }
            }
            tracing::debug!(
                dashboard_id = self.dashboard_id,
                parameters = inner.len(),
                "Applied click effect"
            );
            inner.clone()
        };
        let _ = self.tx.send(snapshot);
    }

    /// Remove every value.
    pub fn clear(&self) {
        let snapshot = {
            let mut inner = self.inner.write();
            inner.clear();
            inner.clone()
        };
        let _ = self.tx.send(snapshot);
    }

    fn assign(values: &mut ParameterValues, id: &str, value: Option<Value>) {
        match value.filter(|v| !v.is_null()) {
            Some(v) => {
                values.insert(id.to_string(), v);
            }
            None => {
                values.shift_remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, Option<Value>)]) -> Vec<(String, Option<Value>)> {
        items
            .iter()
            .map(|(id, v)| (id.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_set_or_unset_toggles() {
        let state = DashboardState::new(1);

        state.apply(&Effect::SetOrUnsetParameterValues(pairs(&[(
            "p1",
            Some(json!("CA")),
        )])));
        assert_eq!(state.value("p1"), Some(json!("CA")));

        // Same value again clears it
        state.apply(&Effect::SetOrUnsetParameterValues(pairs(&[(
            "p1",
            Some(json!("CA")),
        )])));
        assert_eq!(state.value("p1"), None);
    }

    #[test]
    fn test_set_or_unset_none_clears() {
        let mut values = ParameterValues::new();
        values.insert("p1".to_string(), json!("CA"));
        values.insert("p2".to_string(), json!(3));
        let state = DashboardState::with_values(1, values);

        state.apply(&Effect::SetOrUnsetParameterValues(pairs(&[
            ("p1", None),
            ("p2", Some(json!(4))),
        ])));

        assert_eq!(state.value("p1"), None);
        assert_eq!(state.value("p2"), Some(json!(4)));
    }

    #[test]
    fn test_set_parameter_values_does_not_toggle() {
        let state = DashboardState::new(1);
        let effect = Effect::SetParameterValues(pairs(&[("p1", Some(json!("CA")))]));

        state.apply(&effect);
        state.apply(&effect);
        assert_eq!(state.value("p1"), Some(json!("CA")));
    }

    #[test]
    fn test_mutations_broadcast() {
        let state = DashboardState::new(7);
        let rx = state.subscribe();
        assert!(rx.borrow().is_empty());

        state.set_parameter_value("p1", Some(json!("x")));
        assert_eq!(rx.borrow().get("p1"), Some(&json!("x")));

        state.clear();
        assert!(rx.borrow().is_empty());
    }

    #[test]
    fn test_from_extra_data() {
        let extra: ExtraData = serde_json::from_value(json!({
            "dashboard": {
                "id": 4,
                "parameters": [
                    {"id": "p1", "slug": "state"},
                    {"id": "p2", "slug": "city"},
                    {"id": "p3"}
                ]
            },
            "parameterValuesBySlug": {"state": "CA", "city": null}
        }))
        .unwrap();

        let state = DashboardState::from_extra_data(&extra).unwrap();
        assert_eq!(state.dashboard_id(), 4);
        assert_eq!(state.values().len(), 1);
        assert_eq!(state.value("p1"), Some(json!("CA")));

        assert!(DashboardState::from_extra_data(&ExtraData::default()).is_none());
    }
}
