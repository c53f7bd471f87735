use crate::config::ExchangeSettings;
use crate::error::AppError;
use crate::exchange::ExchangeSimulator;
use crate::model::{ProcessReport, Task, TaskKind, UserProfile, normalize_actions, now_rfc3339};
use crate::progress::ProgressObserver;
use crate::storage::StateStore;
use crate::validate::validate_task_url;
use rand::Rng;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub report: ProcessReport,
    pub points: u64,
    pub completed_tasks: u64,
}

pub fn add_task(url: &str, kind: &str, actions: Vec<String>) -> Result<Task, AppError> {
    let store = StateStore::from_env()?;
    add_task_with_store(&store, url, kind, actions)
}

pub fn remove_task(number: &str) -> Result<Task, AppError> {
    let store = StateStore::from_env()?;
    remove_task_with_store(&store, number)
}

pub fn list_tasks() -> Result<Vec<Task>, AppError> {
    Ok(StateStore::from_env()?.load().submitted_tasks)
}

pub fn status() -> Result<UserProfile, AppError> {
    Ok(StateStore::from_env()?.load())
}

pub fn process_tasks(
    settings: &ExchangeSettings,
    observer: &dyn ProgressObserver,
) -> Result<ProcessOutcome, AppError> {
    let store = StateStore::from_env()?;
    let mut simulator = ExchangeSimulator::from_entropy().with_reward(settings.reward_per_task);
    process_tasks_with_store(&store, &mut simulator, settings.batch_size, observer)
}

pub fn export_tasks() -> Result<PathBuf, AppError> {
    let store = StateStore::from_env()?;
    export_tasks_with_store(&store)
}

pub fn reset_progress() -> Result<UserProfile, AppError> {
    let store = StateStore::from_env()?;
    reset_progress_with_store(&store)
}

pub fn set_nickname(nickname: &str) -> Result<UserProfile, AppError> {
    let store = StateStore::from_env()?;
    set_nickname_with_store(&store, nickname)
}

fn add_task_with_store(
    store: &StateStore,
    url: &str,
    kind: &str,
    actions: Vec<String>,
) -> Result<Task, AppError> {
    validate_task_url(url)?;

    let mut profile = store.load();
    let task = Task {
        url: url.trim().to_string(),
        kind: TaskKind::parse_lenient(kind),
        desired_actions: normalize_actions(actions),
        owner: profile.nickname.clone(),
        created_at: now_rfc3339(),
    };

    profile.submitted_tasks.push(task.clone());
    store.save(&mut profile)?;

    Ok(task)
}

fn remove_task_with_store(store: &StateStore, number: &str) -> Result<Task, AppError> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("task number is required"));
    }

    let position = trimmed
        .parse::<usize>()
        .ok()
        .filter(|position| *position > 0)
        .ok_or_else(|| AppError::invalid_input("task number must be a positive integer"))?;

    let mut profile = store.load();
    if position > profile.submitted_tasks.len() {
        return Err(AppError::invalid_input("task not found"));
    }

    let removed = profile.submitted_tasks.remove(position - 1);
    store.save(&mut profile)?;

    Ok(removed)
}

fn process_tasks_with_store<R: Rng>(
    store: &StateStore,
    simulator: &mut ExchangeSimulator<R>,
    batch_size: i64,
    observer: &dyn ProgressObserver,
) -> Result<ProcessOutcome, AppError> {
    let mut profile = store.load();
    let batch = simulator.generate_batch(batch_size);
    observer.on_batch(batch.len());

    let mut report = ProcessReport {
        processed: 0,
        points_added: 0,
    };
    for (index, task) in batch.iter().enumerate() {
        let step = simulator.apply_rewards(&mut profile, std::slice::from_ref(task));
        report.processed += step.processed;
        report.points_added = report.points_added.saturating_add(step.points_added);
        observer.on_task(index + 1, task, profile.points);
    }

    store.save(&mut profile)?;
    info!(
        processed = report.processed,
        points_added = report.points_added,
        balance = profile.points,
        "exchange batch processed"
    );

    Ok(ProcessOutcome {
        report,
        points: profile.points,
        completed_tasks: profile.completed_tasks,
    })
}

fn export_tasks_with_store(store: &StateStore) -> Result<PathBuf, AppError> {
    let profile = store.load();
    store.export_tasks(&profile)
}

fn reset_progress_with_store(store: &StateStore) -> Result<UserProfile, AppError> {
    let mut profile = store.load();
    profile.points = 0;
    profile.completed_tasks = 0;
    store.save(&mut profile)?;
    Ok(profile)
}

fn set_nickname_with_store(store: &StateStore, nickname: &str) -> Result<UserProfile, AppError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("nickname is required"));
    }

    let mut profile = store.load();
    profile.nickname = trimmed.to_string();
    store.save(&mut profile)?;
    Ok(profile)
}
