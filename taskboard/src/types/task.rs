//! Task types: Task, Priority, Assignee

use super::ids::{ColumnId, TaskId, UserId};
use crate::rank::Rank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A task card on the board.
///
/// Only `column_id` and `position` matter to reordering; the rest is payload the view
/// renders and the engine carries along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Owning column. Restamped from the containing column when a board is loaded.
    #[serde(default)]
    pub column_id: ColumnId,
    /// Ordering key within the column; empty when the backend sent none
    #[serde(default, deserialize_with = "rank_or_empty")]
    pub position: Rank,
    /// Human-facing key such as `PRJ-12`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a task with the given id, title and position
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, position: impl Into<Rank>) -> Self {
        Self {
            id: id.into(),
            column_id: ColumnId::default(),
            position: position.into(),
            display_id: None,
            title: title.into(),
            priority: Priority::default(),
            assignees: Vec::new(),
            created_at: None,
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Add an assignee
    pub fn with_assignee(mut self, assignee: Assignee) -> Self {
        self.assignees.push(assignee);
        self
    }

    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assignees.iter().any(|a| &a.id == user)
    }
}

fn rank_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rank, D::Error> {
    Ok(Option::<Rank>::deserialize(deserializer)?.unwrap_or_default())
}

/// Task priority. Unknown values from the backend read as `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }

    /// Parse a priority name (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "URGENT" => Some(Self::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .as_deref()
            .and_then(Priority::parse)
            .unwrap_or_default())
    }
}

/// A user assigned to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Assignee {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
        }
    }

    /// First letter of the name, for avatar placeholders
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next()
    }
}
