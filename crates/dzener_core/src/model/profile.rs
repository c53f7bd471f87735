use super::Task;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NICKNAME: &str = "linux-user";

/// The single local user's persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub nickname: String,
    pub points: u64,
    pub completed_tasks: u64,
    pub last_updated: String,
    pub submitted_tasks: Vec<Task>,
}

impl UserProfile {
    pub fn fresh() -> Self {
        Self {
            nickname: DEFAULT_NICKNAME.to_string(),
            points: 0,
            completed_tasks: 0,
            last_updated: super::now_rfc3339(),
            submitted_tasks: Vec::new(),
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::fresh()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub processed: usize,
    pub points_added: u64,
}
