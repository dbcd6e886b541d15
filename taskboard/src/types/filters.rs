//! Board filters.
//!
//! Filtering happens on the backend; the client only needs to know which filters to send
//! and whether the board it holds is a filtered subset (which disables dragging).

use super::task::Priority;
use serde::{Deserialize, Serialize};

/// Filters applied when fetching a board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFilters {
    /// Free-text search over task titles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Only tasks with this priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Only tasks assigned to the current user
    #[serde(default)]
    pub mine: bool,
}

impl BoardFilters {
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn mine_only(mut self) -> Self {
        self.mine = true;
        self
    }

    /// Keyword with surrounding whitespace removed, if anything remains
    pub fn effective_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// True when the fetched board is a subset of the real one
    pub fn is_active(&self) -> bool {
        self.effective_keyword().is_some() || self.priority.is_some() || self.mine
    }

    /// Query parameters for the board endpoint; inactive filters are omitted
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(keyword) = self.effective_keyword() {
            pairs.push(("keyword", keyword.to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if self.mine {
            pairs.push(("isMyTask", "true".to_string()));
        }
        pairs
    }
}
