use crate::config::StoreConfig;
use crate::error::AppError;
use crate::model::{DEFAULT_ACTION, DEFAULT_NICKNAME, Task, TaskKind, UserProfile, now_rfc3339};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const QUARANTINE_EXTENSION: &str = "corrupted.json";

/// A repair applied while loading the profile document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDiagnostic {
    Quarantined { moved_to: PathBuf, reason: String },
    QuarantineFailed { reason: String },
    ClampedNegative { field: &'static str, value: i128 },
    FieldReset { field: String, reason: String },
    DroppedTask { index: usize, reason: String },
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quarantined { moved_to, reason } => write!(
                f,
                "unreadable state moved to {} ({reason})",
                moved_to.display()
            ),
            Self::QuarantineFailed { reason } => {
                write!(f, "could not move unreadable state aside: {reason}")
            }
            Self::ClampedNegative { field, value } => {
                write!(f, "{field} was {value}, clamped to 0")
            }
            Self::FieldReset { field, reason } => write!(f, "{field} reset to default: {reason}"),
            Self::DroppedTask { index, reason } => {
                write!(f, "submitted task #{index} dropped: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileLoad {
    pub profile: UserProfile,
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// Owns the on-disk profile document and its export.
#[derive(Debug, Clone)]
pub struct StateStore {
    config: StoreConfig,
}

impl StateStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(StoreConfig::from_env()?))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn state_path(&self) -> PathBuf {
        self.config.state_path()
    }

    /// Always yields a usable profile, whatever is on disk.
    pub fn load(&self) -> UserProfile {
        self.load_with_diagnostics().profile
    }

    pub fn load_with_diagnostics(&self) -> ProfileLoad {
        let path = self.state_path();
        let mut diagnostics = Vec::new();

        let profile = match read_document(&path, &mut diagnostics) {
            Some(document) if !document.is_empty() => {
                profile_from_document(&document, &mut diagnostics)
            }
            _ => UserProfile::fresh(),
        };

        for diagnostic in &diagnostics {
            warn!(path = %path.display(), "{diagnostic}");
        }

        ProfileLoad {
            profile,
            diagnostics,
        }
    }

    /// Replaces the whole document. `last_updated` is stamped only once the
    /// write has succeeded.
    pub fn save(&self, profile: &mut UserProfile) -> Result<(), AppError> {
        let path = self.state_path();
        let stamped = UserProfile {
            last_updated: now_rfc3339(),
            ..profile.clone()
        };
        let content = serde_json::to_string_pretty(&stamped)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        write_private(&path, &content)?;
        profile.last_updated = stamped.last_updated;

        debug!(
            path = %path.display(),
            tasks = profile.submitted_tasks.len(),
            points = profile.points,
            "profile saved"
        );
        Ok(())
    }

    /// Writes the submitted tasks, and nothing else, to the export file.
    pub fn export_tasks(&self, profile: &UserProfile) -> Result<PathBuf, AppError> {
        let path = self.config.export_path();
        let content = serde_json::to_string_pretty(&profile.submitted_tasks)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        write_private(&path, &content)?;

        debug!(
            path = %path.display(),
            tasks = profile.submitted_tasks.len(),
            "tasks exported"
        );
        Ok(path)
    }
}

fn write_private(path: &Path, content: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io_at(parent, err))?;
    }

    std::fs::write(path, content).map_err(|err| AppError::io_at(path, err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io_at(path, err))?;
    }

    Ok(())
}

fn read_document(path: &Path, diagnostics: &mut Vec<LoadDiagnostic>) -> Option<Map<String, Value>> {
    if !path.exists() {
        return None;
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|content| {
            serde_json::from_str::<Value>(&content).map_err(|err| err.to_string())
        });

    match parsed {
        Ok(Value::Object(document)) => Some(document),
        Ok(_) => {
            quarantine(path, "state document is not a JSON object", diagnostics);
            None
        }
        Err(reason) => {
            quarantine(path, &reason, diagnostics);
            None
        }
    }
}

fn quarantine(path: &Path, reason: &str, diagnostics: &mut Vec<LoadDiagnostic>) {
    let moved_to = path.with_extension(QUARANTINE_EXTENSION);
    match std::fs::rename(path, &moved_to) {
        Ok(()) => diagnostics.push(LoadDiagnostic::Quarantined {
            moved_to,
            reason: reason.to_string(),
        }),
        Err(err) => diagnostics.push(LoadDiagnostic::QuarantineFailed {
            reason: format!("{reason}; rename failed: {err}"),
        }),
    }
}

fn profile_from_document(
    document: &Map<String, Value>,
    diagnostics: &mut Vec<LoadDiagnostic>,
) -> UserProfile {
    let nickname = match document.get("nickname") {
        Some(Value::String(nickname)) => nickname.clone(),
        None => DEFAULT_NICKNAME.to_string(),
        Some(_) => {
            diagnostics.push(LoadDiagnostic::FieldReset {
                field: "nickname".to_string(),
                reason: "not a string".to_string(),
            });
            DEFAULT_NICKNAME.to_string()
        }
    };

    let points = read_counter(document, "points", diagnostics);
    let completed_tasks = read_counter(document, "completed_tasks", diagnostics);

    let last_updated = match document.get("last_updated") {
        Some(Value::String(value)) => value.clone(),
        _ => now_rfc3339(),
    };

    let submitted_tasks = match document.get("submitted_tasks") {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| task_from_value(index + 1, entry, &nickname, diagnostics))
            .collect(),
        Some(_) => {
            diagnostics.push(LoadDiagnostic::FieldReset {
                field: "submitted_tasks".to_string(),
                reason: "not a list".to_string(),
            });
            Vec::new()
        }
    };

    UserProfile {
        nickname,
        points,
        completed_tasks,
        last_updated,
        submitted_tasks,
    }
}

fn read_counter(
    document: &Map<String, Value>,
    field: &'static str,
    diagnostics: &mut Vec<LoadDiagnostic>,
) -> u64 {
    let Some(raw) = document.get(field) else {
        return 0;
    };

    let Some(value) = coerce_integer(raw) else {
        diagnostics.push(LoadDiagnostic::FieldReset {
            field: field.to_string(),
            reason: format!("{raw} is not an integer"),
        });
        return 0;
    };

    if value < 0 {
        diagnostics.push(LoadDiagnostic::ClampedNegative { field, value });
        return 0;
    }

    u64::try_from(value).unwrap_or(u64::MAX)
}

fn coerce_integer(value: &Value) -> Option<i128> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .map(i128::from)
            .or_else(|| number.as_u64().map(i128::from))
            .or_else(|| number.as_f64().map(|float| float.trunc() as i128)),
        Value::String(text) => text.trim().parse::<i128>().ok(),
        Value::Bool(flag) => Some(i128::from(*flag)),
        _ => None,
    }
}

fn task_from_value(
    index: usize,
    value: &Value,
    nickname: &str,
    diagnostics: &mut Vec<LoadDiagnostic>,
) -> Option<Task> {
    let Value::Object(entry) = value else {
        diagnostics.push(LoadDiagnostic::DroppedTask {
            index,
            reason: "not an object".to_string(),
        });
        return None;
    };

    let Some(Value::String(url)) = entry.get("url") else {
        diagnostics.push(LoadDiagnostic::DroppedTask {
            index,
            reason: "missing url".to_string(),
        });
        return None;
    };

    let kind = match entry.get("kind") {
        Some(Value::String(kind)) => TaskKind::parse_lenient(kind),
        _ => TaskKind::Article,
    };

    let mut desired_actions: Vec<String> = match entry.get("desired_actions") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    if desired_actions.is_empty() {
        desired_actions.push(DEFAULT_ACTION.to_string());
    }

    let owner = match entry.get("owner") {
        Some(Value::String(owner)) => owner.clone(),
        _ => nickname.to_string(),
    };

    let created_at = match entry.get("created_at") {
        Some(Value::String(created_at)) => created_at.clone(),
        _ => now_rfc3339(),
    };

    Some(Task {
        url: url.clone(),
        kind,
        desired_actions,
        owner,
        created_at,
    })
}
