pub mod config;
pub mod error;
pub mod exchange;
pub mod exchange_api;
pub mod model;
pub mod progress;
pub mod storage;
pub mod validate;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{DEFAULT_NICKNAME, Task, TaskKind, UserProfile};

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            url: "https://dzen.ru/a/demo".to_string(),
            kind: TaskKind::Article,
            desired_actions: vec!["like".to_string()],
            owner: "neo".to_string(),
            created_at: "2025-12-20T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["url"], "https://dzen.ru/a/demo");
        assert_eq!(json["kind"], "article");
        assert_eq!(json["desired_actions"][0], "like");
        assert_eq!(json["owner"], "neo");
        assert_eq!(json["created_at"], "2025-12-20T00:00:00Z");
    }

    #[test]
    fn fresh_profile_is_empty() {
        let profile = UserProfile::fresh();
        assert_eq!(profile.nickname, DEFAULT_NICKNAME);
        assert_eq!(profile.points, 0);
        assert_eq!(profile.completed_tasks, 0);
        assert!(profile.submitted_tasks.is_empty());
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::invalid_input("bad link");
        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.to_string(), "invalid_input - bad link");
    }
}
