//! Project list cache for DevPulse.
//!
//! This crate provides trait-based cache and source interfaces with a
//! single-file JSON implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{ProjectCache, ProjectSource, StorageError, Result};
pub use json_storage::{
    cached_projects, filter_projects_by_name, CachedProjects, JsonProjectCache, JsonProjectSource,
    DEFAULT_MAX_AGE_HOURS,
};
