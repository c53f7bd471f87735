use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ACTION: &str = "read/watch to the end";

/// Numbered actions a submitter can ask other users to perform.
pub const ACTION_CATALOG: [(&str, &str); 7] = [
    ("1", DEFAULT_ACTION),
    ("2", "like"),
    ("3", "dislike"),
    ("4", "subscribe"),
    ("5", "bookmark"),
    ("6", "comment"),
    ("7", "like/dislike a comment"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub url: String,
    pub kind: TaskKind,
    pub desired_actions: Vec<String>,
    pub owner: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Article,
    Video,
}

impl TaskKind {
    /// Unknown or blank values fall back to `Article`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "video" => Self::Video,
            _ => Self::Article,
        }
    }

    /// `Video` when any path segment of the link is `video`.
    pub fn infer_from_url(raw: &str) -> Self {
        let has_video_segment = match url::Url::parse(raw) {
            Ok(parsed) => parsed
                .path_segments()
                .map(|mut segments| segments.any(|segment| segment == "video"))
                .unwrap_or(false),
            Err(_) => raw.contains("/video/"),
        };

        if has_video_segment {
            Self::Video
        } else {
            Self::Article
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps comma separated catalog codes (`"1,2,4"`) to action labels.
pub fn actions_from_codes(raw: &str) -> Vec<String> {
    let actions = raw
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .filter_map(|code| {
            ACTION_CATALOG
                .iter()
                .find(|(catalog_code, _)| *catalog_code == code)
                .map(|(_, label)| label.to_string())
        })
        .collect();
    normalize_actions(actions)
}

/// Drops blank labels; an empty result becomes the default action.
pub fn normalize_actions(actions: Vec<String>) -> Vec<String> {
    let cleaned: Vec<String> = actions
        .into_iter()
        .map(|action| action.trim().to_string())
        .filter(|action| !action.is_empty())
        .collect();

    if cleaned.is_empty() {
        vec![DEFAULT_ACTION.to_string()]
    } else {
        cleaned
    }
}
