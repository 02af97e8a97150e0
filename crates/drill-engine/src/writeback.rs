//! Writeback actions on the object-detail view.
//!
//! Deleting a row issues one request through [`ActionsApi`], then reports
//! what happened to the view through a [`Dispatcher`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use drill_core::{ApiError, EntityId, QueryType, Table};

/// Action type recorded when a row is deleted from the object detail.
pub const DELETE_ROW_FROM_OBJECT_DETAIL: &str = "drill/qb/DELETE_ROW_FROM_OBJECT_DETAIL";

/// Primary-key value of a row as the view holds it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Str(String),
}

impl RowId {
    /// Value to filter on. String ids of numeric keys become integers.
    fn to_pk_value(&self, numeric: bool) -> Result<Value, WritebackError> {
        match self {
            RowId::Str(s) if numeric => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| WritebackError::InvalidPrimaryKey(s.clone())),
            RowId::Str(s) => Ok(Value::String(s.clone())),
            RowId::Int(i) => Ok(Value::from(*i)),
        }
    }
}

/// A row to delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteRowPayload {
    pub table: Table,
    pub id: RowId,
}

/// Structured query selecting the row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteRowQuery {
    #[serde(rename = "source-table")]
    pub source_table: EntityId,
    pub filter: Value,
}

/// Request body of the delete-row action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteRowRequest {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    pub database: EntityId,
    pub query: DeleteRowQuery,
}

/// Response of the delete-row action.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeleteRowResponse {
    #[serde(rename = "rows-deleted", default)]
    pub rows_deleted: Option<Vec<Value>>,
}

impl DeleteRowResponse {
    pub fn deleted_any(&self) -> bool {
        self.rows_deleted.as_ref().is_some_and(|rows| !rows.is_empty())
    }
}

/// Events reported to the object-detail view.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailEvent {
    /// The delete request completed.
    RowDeleted(DeleteRowPayload),
    /// Close the object-detail modal.
    CloseObjectDetail,
    /// Re-run the question behind the view.
    RunQuestionQuery,
}

impl DetailEvent {
    pub fn action_type(&self) -> &'static str {
        match self {
            DetailEvent::RowDeleted(_) => DELETE_ROW_FROM_OBJECT_DETAIL,
            DetailEvent::CloseObjectDetail => "drill/qb/CLOSE_OBJECT_DETAIL",
            DetailEvent::RunQuestionQuery => "drill/qb/RUN_QUERY",
        }
    }
}

/// Writeback endpoints of the BI server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionsApi: Send + Sync {
    async fn delete_row(&self, request: &DeleteRowRequest)
        -> Result<DeleteRowResponse, ApiError>;
}

/// Receives events for the view.
#[cfg_attr(test, mockall::automock)]
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, event: DetailEvent);
}

/// Writeback errors.
#[derive(Debug, Error)]
pub enum WritebackError {
    /// The table has no primary-key field.
    #[error("Cannot delete row from table without a primary key")]
    NoPrimaryKey { table_id: EntityId },

    /// A string id could not be read as a numeric key.
    #[error("Invalid primary key value: {0}")]
    InvalidPrimaryKey(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Build the delete request for a row. Fails before any I/O when the
/// table has no primary key.
pub fn delete_row_request(payload: &DeleteRowPayload) -> Result<DeleteRowRequest, WritebackError> {
    let table = &payload.table;
    let field = table
        .primary_key()
        .ok_or(WritebackError::NoPrimaryKey { table_id: table.id })?;
    let pk = payload.id.to_pk_value(field.is_numeric())?;

    Ok(DeleteRowRequest {
        query_type: QueryType::Query,
        database: table.db_id,
        query: DeleteRowQuery {
            source_table: table.id,
            filter: json!(["=", field.reference(), pk]),
        },
    })
}

/// Delete a row shown in the object detail.
///
/// Dispatches [`DetailEvent::RowDeleted`] once the request completes. When
/// rows were actually deleted the detail is closed and the question re-run.
pub async fn delete_row_from_object_detail(
    api: &dyn ActionsApi,
    dispatcher: &dyn Dispatcher,
    payload: DeleteRowPayload,
) -> Result<DeleteRowResponse, WritebackError> {
    let request = delete_row_request(&payload)?;
    tracing::info!(
        table_id = payload.table.id,
        database = payload.table.db_id,
        "Deleting row from object detail"
    );

    let response = api.delete_row(&request).await?;

    dispatcher.dispatch(DetailEvent::RowDeleted(payload));
    if response.deleted_any() {
        dispatcher.dispatch(DetailEvent::CloseObjectDetail);
        dispatcher.dispatch(DetailEvent::RunQuestionQuery);
    } else {
        tracing::warn!("Delete request completed but no rows were deleted");
    }

    Ok(response)
}
