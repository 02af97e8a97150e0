//! Core types for dashboard click-through behavior.
//!
//! This crate contains the data shared by the drill crates:
//! - Click-behavior configuration
//! - Click-time context and pre-fetched entities
//! - Resolved actions and effects
//! - Configuration types
//! - Error types

mod action;
mod click_behavior;
mod clicked;
mod config;
mod entity;
mod error;

pub use action::{ActionTarget, Effect, ParameterValuePair, ResolvedAction, CLICK_BEHAVIOR_ACTION};
pub use click_behavior::{
    ClickBehavior, MappingEntry, MappingSource, MappingTarget, ParameterMapping, SourceType,
};
pub use clicked::{Clicked, Column, ColumnSettings, ColumnValue, ExtraData, VisualizationSettings};
pub use config::{config_dir, config_path, DrillConfig};
pub use entity::{
    Card, Dashboard, DatasetQuery, EntityId, Field, Parameter, QueryType, Segment, Table,
};
pub use error::{ApiError, ConfigError};
