use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub duration_minutes: i32,
    pub instructions: String,
    pub is_active: bool,
    pub randomize_questions: bool,
    pub randomize_options: bool,
    pub created_by: String,  // Owning admin
    pub class_label: String, // Students of this class may take it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn duration_seconds(&self) -> i32 {
        self.duration_minutes.max(0) * 60
    }
}
