use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Grouping label for sheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Category with the number of sheets currently referencing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub sheet_count: i64,
}

impl Category {
    /// Normalise a client-supplied name, rejecting blank input
    pub fn normalize_name(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
