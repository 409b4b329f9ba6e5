//! Tracker project model.

use serde::{Deserialize, Serialize};

/// A project in the tracking service's organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Tracker project id
    pub id: String,

    /// Project name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// API URL
    #[serde(default)]
    pub url: String,
}

impl Project {
    /// Create a project with empty description and URL.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            url: String::new(),
        }
    }
}
