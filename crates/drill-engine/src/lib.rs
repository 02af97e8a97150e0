//! Click-through engine for dashboards.
//!
//! This crate provides:
//! - Click-behavior resolution into a single action
//! - Value formatting, link templates and question URLs
//! - Observable dashboard parameter state
//! - Row deletion from the object-detail view
//! - Segment listing and retirement
//! - An HTTP client for the BI server API

pub mod click_data;
pub mod format;
pub mod http;
pub mod link;
pub mod query_string;
pub mod question;
pub mod resolver;
pub mod segments;
pub mod state;
pub mod writeback;

// Re-export commonly used types
pub use click_data::ClickData;
pub use http::HttpClient;
pub use resolver::{click_behavior_actions, resolve};
pub use segments::{SegmentList, SegmentsApi};
pub use state::{DashboardState, ParameterValues};
pub use writeback::{
    delete_row_from_object_detail, ActionsApi, DeleteRowPayload, DeleteRowResponse, DetailEvent,
    Dispatcher, RowId, WritebackError,
};
