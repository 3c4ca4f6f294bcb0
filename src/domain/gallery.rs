//! Gallery domain types
//!
//! Posts and job postings shown in the profile's gallery tabs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profiles::ItemId;

/// Which gallery feed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryKind {
    Posts,
    Jobs,
}

impl std::fmt::Display for GalleryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GalleryKind::Posts => write!(f, "posts"),
            GalleryKind::Jobs => write!(f, "jobs"),
        }
    }
}

/// Post published by a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Job posting published by a company profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Items of one gallery feed
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryFeed {
    Posts(Vec<Post>),
    Jobs(Vec<JobPosting>),
}

impl GalleryFeed {
    pub fn empty(kind: GalleryKind) -> Self {
        match kind {
            GalleryKind::Posts => Self::Posts(Vec::new()),
            GalleryKind::Jobs => Self::Jobs(Vec::new()),
        }
    }

    pub fn kind(&self) -> GalleryKind {
        match self {
            Self::Posts(_) => GalleryKind::Posts,
            Self::Jobs(_) => GalleryKind::Jobs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Posts(items) => items.len(),
            Self::Jobs(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
