//! Segment management list.

use async_trait::async_trait;

use drill_core::{ApiError, EntityId, Segment};

/// Where the "New segment" button leads.
pub const NEW_SEGMENT_PATH: &str = "/admin/datamodel/segment/create";

/// Shown when a table has no segments.
pub const EMPTY_SEGMENTS_MESSAGE: &str =
    "Create segments to add them to the Filter dropdown in the query builder";

/// Segment endpoints of the BI server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SegmentsApi: Send + Sync {
    /// All segments the user can see.
    async fn list_segments(&self) -> Result<Vec<Segment>, ApiError>;

    /// Archive or restore a segment.
    async fn set_archived(&self, id: EntityId, archived: bool) -> Result<Segment, ApiError>;
}

/// Active segments, optionally restricted to one table.
#[derive(Debug, Clone)]
pub struct SegmentList {
    table_id: Option<EntityId>,
    segments: Vec<Segment>,
}

impl SegmentList {
    /// Fetch segments, keeping non-archived ones on `table_id` (all tables
    /// when `None`).
    pub async fn load(api: &dyn SegmentsApi, table_id: Option<EntityId>) -> Result<Self, ApiError> {
        let segments = api
            .list_segments()
            .await?
            .into_iter()
            .filter(|s| !s.archived && table_id.map_or(true, |t| s.table_id == t))
            .collect::<Vec<_>>();
        tracing::debug!(?table_id, count = segments.len(), "Loaded segments");
        Ok(Self { table_id, segments })
    }

    pub fn table_id(&self) -> Option<EntityId> {
        self.table_id
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Empty-state text, when there is nothing to list.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_SEGMENTS_MESSAGE)
    }

    /// Archive a segment and drop it from the list.
    pub async fn retire(&mut self, api: &dyn SegmentsApi, id: EntityId) -> Result<(), ApiError> {
        api.set_archived(id, true).await?;
        self.segments.retain(|s| s.id != id);
        tracing::info!(segment_id = id, "Retired segment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn segment(id: EntityId, table_id: EntityId, archived: bool) -> Segment {
        Segment {
            id,
            name: format!("Segment {}", id),
            table_id,
            description: None,
            archived,
            definition: serde_json::Value::Null,
        }
    }

    fn api_with(segments: Vec<Segment>) -> MockSegmentsApi {
        let mut api = MockSegmentsApi::new();
        api.expect_list_segments()
            .returning(move || Ok(segments.clone()));
        api
    }

    #[tokio::test]
    async fn test_load_filters_table_and_archived() {
        let api = api_with(vec![
            segment(1, 10, false),
            segment(2, 10, true),
            segment(3, 20, false),
        ]);

        let list = SegmentList::load(&api, Some(10)).await.unwrap();
        let ids: Vec<_> = list.segments().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1]);
        assert!(list.empty_message().is_none());

        let all = SegmentList::load(&api, None).await.unwrap();
        assert_eq!(all.segments().len(), 2);
    }

    #[tokio::test]
    async fn test_retire_removes_segment() {
        let mut api = api_with(vec![segment(1, 10, false)]);
        api.expect_set_archived()
            .with(eq(1), eq(true))
            .times(1)
            .returning(|id, _| Ok(segment(id, 10, true)));

        let mut list = SegmentList::load(&api, Some(10)).await.unwrap();
        list.retire(&api, 1).await.unwrap();

        assert!(list.is_empty());
        assert_eq!(list.empty_message(), Some(EMPTY_SEGMENTS_MESSAGE));
    }

    #[tokio::test]
    async fn test_retire_failure_keeps_segment() {
        let mut api = api_with(vec![segment(1, 10, false)]);
        api.expect_set_archived()
            .returning(|_, _| Err(ApiError::Http("connection refused".to_string())));

        let mut list = SegmentList::load(&api, Some(10)).await.unwrap();
        assert!(list.retire(&api, 1).await.is_err());
        assert_eq!(list.segments().len(), 1);
    }
}
