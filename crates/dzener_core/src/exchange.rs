//! Fabricates "other people's" exchange tasks and credits the local user for
//! working through them.

use crate::config::{MAX_BATCH_SIZE, POINTS_PER_TASK};
use crate::model::{DEFAULT_ACTION, ProcessReport, Task, TaskKind, UserProfile, now_rfc3339};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const DEMO_URLS: [&str; 4] = [
    "https://dzen.ru/a/demo_article_1",
    "https://dzen.ru/video/watch/demo_2",
    "https://zen.yandex.ru/media/demo_3",
    "https://dzen.ru/a/demo_article_4",
];

pub const DEMO_OWNERS: [&str; 4] = ["alice", "bob", "charlie", "mike"];

/// Second action attached to every generated task.
pub const EXTRA_ACTIONS: [&str; 3] = ["like", "subscribe", "bookmark"];

pub struct ExchangeSimulator<R> {
    rng: R,
    reward_per_task: u64,
}

impl ExchangeSimulator<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy(), POINTS_PER_TASK)
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), POINTS_PER_TASK)
    }
}

impl<R: Rng> ExchangeSimulator<R> {
    pub fn new(rng: R, reward_per_task: u64) -> Self {
        Self {
            rng,
            reward_per_task,
        }
    }

    pub fn with_reward(mut self, reward_per_task: u64) -> Self {
        self.reward_per_task = reward_per_task;
        self
    }

    pub fn reward_per_task(&self) -> u64 {
        self.reward_per_task
    }

    /// Builds `count` tasks from the demo pools, clamped to `1..=MAX_BATCH_SIZE`.
    pub fn generate_batch(&mut self, count: i64) -> Vec<Task> {
        let amount = count.clamp(1, MAX_BATCH_SIZE) as usize;
        (0..amount).map(|_| self.generate_task()).collect()
    }

    fn generate_task(&mut self) -> Task {
        let url = pick(&DEMO_URLS, &mut self.rng);
        let extra = pick(&EXTRA_ACTIONS, &mut self.rng);
        let owner = pick(&DEMO_OWNERS, &mut self.rng);

        Task {
            url: url.to_string(),
            kind: TaskKind::infer_from_url(url),
            desired_actions: vec![DEFAULT_ACTION.to_string(), extra.to_string()],
            owner: owner.to_string(),
            created_at: now_rfc3339(),
        }
    }

    /// Credits the profile for every task in `batch`. Does not persist.
    pub fn apply_rewards(&self, profile: &mut UserProfile, batch: &[Task]) -> ProcessReport {
        for _ in batch {
            profile.points = profile.points.saturating_add(self.reward_per_task);
            profile.completed_tasks = profile.completed_tasks.saturating_add(1);
        }

        ProcessReport {
            processed: batch.len(),
            points_added: self.reward_per_task.saturating_mul(batch.len() as u64),
        }
    }
}

fn pick<'a, R: Rng>(pool: &[&'a str], rng: &mut R) -> &'a str {
    pool.choose(rng).copied().unwrap_or(pool[0])
}

#[cfg(test)]
mod tests {
    use super::{DEMO_OWNERS, DEMO_URLS, EXTRA_ACTIONS, ExchangeSimulator};
    use crate::config::MAX_BATCH_SIZE;
    use crate::model::{DEFAULT_ACTION, Task, TaskKind, UserProfile};

    fn shape(batch: &[Task]) -> Vec<(String, TaskKind, Vec<String>, String)> {
        batch
            .iter()
            .map(|task| {
                (
                    task.url.clone(),
                    task.kind,
                    task.desired_actions.clone(),
                    task.owner.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn generate_batch_returns_requested_count() {
        let mut simulator = ExchangeSimulator::seeded(1);
        assert_eq!(simulator.generate_batch(6).len(), 6);
        assert_eq!(simulator.generate_batch(11).len(), 11);
    }

    #[test]
    fn generate_batch_clamps_to_at_least_one() {
        let mut simulator = ExchangeSimulator::seeded(1);
        assert_eq!(simulator.generate_batch(0).len(), 1);
        assert_eq!(simulator.generate_batch(-5).len(), 1);
    }

    #[test]
    fn generate_batch_caps_huge_counts() {
        let mut simulator = ExchangeSimulator::seeded(1);
        assert_eq!(
            simulator.generate_batch(i64::MAX).len(),
            MAX_BATCH_SIZE as usize
        );
        assert_eq!(
            simulator.generate_batch(MAX_BATCH_SIZE + 1).len(),
            MAX_BATCH_SIZE as usize
        );
    }

    #[test]
    fn generated_tasks_come_from_demo_pools() {
        let mut simulator = ExchangeSimulator::seeded(99);

        for task in simulator.generate_batch(50) {
            assert!(DEMO_URLS.contains(&task.url.as_str()));
            assert!(DEMO_OWNERS.contains(&task.owner.as_str()));
            assert_eq!(task.desired_actions.len(), 2);
            assert_eq!(task.desired_actions[0], DEFAULT_ACTION);
            assert!(EXTRA_ACTIONS.contains(&task.desired_actions[1].as_str()));

            let expected = if task.url.contains("/video/") {
                TaskKind::Video
            } else {
                TaskKind::Article
            };
            assert_eq!(task.kind, expected);
        }
    }

    #[test]
    fn same_seed_produces_same_batch() {
        let first = ExchangeSimulator::seeded(2024).generate_batch(8);
        let second = ExchangeSimulator::seeded(2024).generate_batch(8);
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn apply_rewards_credits_each_task() {
        let mut simulator = ExchangeSimulator::seeded(5).with_reward(3);
        let batch = simulator.generate_batch(4);
        let mut profile = UserProfile::fresh();
        profile.points = 10;
        profile.completed_tasks = 1;
        let submitted_before = profile.submitted_tasks.clone();

        let report = simulator.apply_rewards(&mut profile, &batch);

        assert_eq!(report.processed, 4);
        assert_eq!(report.points_added, 12);
        assert_eq!(profile.points, 22);
        assert_eq!(profile.completed_tasks, 5);
        assert_eq!(profile.submitted_tasks, submitted_before);
    }

    #[test]
    fn apply_rewards_saturates_instead_of_overflowing() {
        let simulator = ExchangeSimulator::seeded(5);
        let mut profile = UserProfile::fresh();
        profile.points = u64::MAX - 1;
        let batch = ExchangeSimulator::seeded(6).generate_batch(2);

        simulator.apply_rewards(&mut profile, &batch);

        assert_eq!(profile.points, u64::MAX);
        assert_eq!(profile.completed_tasks, 2);
    }
}
