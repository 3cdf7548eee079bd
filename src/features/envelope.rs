//! List responses come back either paginated or as a bare array depending on
//! the endpoint's pagination settings. Both shapes decode into
//! [`ListEnvelope`] so callers never branch on the raw JSON.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Paginated {
        /// Absent for cursor pagination.
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    /// Items of this page, or of the whole list for bare responses.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paginated { results, .. } => results,
            Self::Bare(items) => items,
        }
    }

    /// Total reported by the server. Falls back to the number of items held
    /// when the server does not report one.
    #[must_use]
    pub fn total(&self) -> u64 {
        match self {
            Self::Paginated {
                count: Some(count), ..
            } => *count,
            Self::Paginated { results, .. } => results.len() as u64,
            Self::Bare(items) => items.len() as u64,
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        matches!(self, Self::Paginated { next: Some(_), .. })
    }
}
