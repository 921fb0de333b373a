use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::companion::{Companion, CompanionEvent};
use crate::config::SchedulerConfig;
use crate::core::PersistenceStore;

/// Failed tasks are retried after this many minutes
const RETRY_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskType {
    SpecialDateCheck,
    InactivityReminder,
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskType::SpecialDateCheck => write!(f, "special_date_check"),
            TaskType::InactivityReminder => write!(f, "inactivity_reminder"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub task_type: TaskType,
    pub next_run: DateTime<Utc>,
    pub interval: Duration,
    pub run_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskExecution {
    pub task_type: TaskType,
    pub execution_time: DateTime<Utc>,
    pub success: bool,
    pub events: usize,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct TickReport {
    pub executions: Vec<TaskExecution>,
    pub events: Vec<CompanionEvent>,
}

/// Drives the clock-based companion checks.
///
/// Tasks only decide *when* to poll; the at-most-once guarantees live in the
/// store sentinels, so a restarted scheduler never repeats an event.
pub struct EventScheduler {
    tasks: Vec<ScheduledTask>,
    tick_every: std::time::Duration,
}

impl EventScheduler {
    pub fn new(config: &SchedulerConfig, now: DateTime<Utc>) -> Self {
        let task = |task_type, minutes: i64| ScheduledTask {
            task_type,
            next_run: now,
            interval: Duration::minutes(minutes.max(1)),
            run_count: 0,
        };

        EventScheduler {
            tasks: vec![
                task(TaskType::SpecialDateCheck, config.special_date_interval_mins),
                task(TaskType::InactivityReminder, config.reminder_interval_mins),
            ],
            tick_every: std::time::Duration::from_secs(config.tick_secs.max(1)),
        }
    }

    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    pub fn due_tasks(&self, now: DateTime<Utc>) -> Vec<TaskType> {
        self.tasks
            .iter()
            .filter(|task| task.next_run <= now)
            .map(|task| task.task_type)
            .collect()
    }

    /// Run every task whose time has come
    pub fn tick<S: PersistenceStore>(
        &mut self,
        now: DateTime<Utc>,
        companion: &mut Companion<S>,
    ) -> TickReport {
        let mut report = TickReport::default();

        for task in self.tasks.iter_mut().filter(|task| task.next_run <= now) {
            let result = match task.task_type {
                TaskType::SpecialDateCheck => companion.check_special_dates(now),
                TaskType::InactivityReminder => companion.check_reminder(now),
            };

            let mut execution = TaskExecution {
                task_type: task.task_type,
                execution_time: now,
                success: false,
                events: 0,
                error: None,
            };

            match result {
                Ok(events) => {
                    execution.success = true;
                    execution.events = events.len();
                    task.run_count += 1;
                    task.next_run = now + task.interval;
                    debug!(task = %task.task_type, events = events.len(), "task finished");
                    report.events.extend(events);
                }
                Err(e) => {
                    warn!(task = %task.task_type, error = %e, "task failed, retrying later");
                    execution.error = Some(e.to_string());
                    task.next_run = now + Duration::minutes(RETRY_MINUTES);
                }
            }

            report.executions.push(execution);
        }

        report
    }

    /// Poll until Ctrl-C, handing every event to `on_event`
    pub async fn run<S, F>(&mut self, companion: &mut Companion<S>, mut on_event: F) -> Result<()>
    where
        S: PersistenceStore,
        F: FnMut(&CompanionEvent),
    {
        info!(tick_secs = self.tick_every.as_secs(), "scheduler started");
        let mut ticker = tokio::time::interval(self.tick_every);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.tick(Utc::now(), companion);
                    for event in &report.events {
                        on_event(event);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("scheduler stopped");
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelationshipConfig;
    use crate::core::{CharacterProfile, MemoryStore, Message, Sender};
    use chrono::TimeZone;

    fn companion() -> Companion<MemoryStore> {
        let config = RelationshipConfig {
            utc_offset_minutes: Some(0),
            ..RelationshipConfig::default()
        };
        let mut companion = Companion::open(MemoryStore::new(), &config).unwrap();
        companion
            .create_character(CharacterProfile::new("Linh"))
            .unwrap();
        companion
    }

    fn at(m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_all_tasks_due_at_start() {
        let scheduler = EventScheduler::new(&SchedulerConfig::default(), at(1, 5, 9, 0));
        assert_eq!(
            scheduler.due_tasks(at(1, 5, 9, 0)),
            vec![TaskType::SpecialDateCheck, TaskType::InactivityReminder]
        );
    }

    #[test]
    fn test_intervals_respected() {
        let start = at(1, 5, 9, 0);
        let mut scheduler = EventScheduler::new(&SchedulerConfig::default(), start);
        let mut companion = companion();

        let report = scheduler.tick(start, &mut companion);
        assert_eq!(report.executions.len(), 2);
        assert!(report.executions.iter().all(|e| e.success));

        assert!(scheduler.due_tasks(at(1, 5, 9, 20)).is_empty());
        assert_eq!(
            scheduler.due_tasks(at(1, 5, 9, 30)),
            vec![TaskType::InactivityReminder]
        );
        assert_eq!(scheduler.due_tasks(at(1, 5, 10, 0)).len(), 2);
    }

    #[test]
    fn test_valentine_fires_once_across_ticks() {
        let start = at(2, 14, 8, 0);
        let mut scheduler = EventScheduler::new(&SchedulerConfig::default(), start);
        let mut companion = companion();

        let first = scheduler.tick(start, &mut companion);
        assert_eq!(first.events.len(), 1);

        let later = scheduler.tick(at(2, 14, 12, 0), &mut companion);
        assert!(later.events.is_empty());
        assert_eq!(scheduler.tasks()[0].run_count, 2);
    }

    #[test]
    fn test_reminder_via_scheduler() {
        let mut companion = companion();
        companion
            .record_user_message(Message::new(Sender::User, "chúc ngủ ngon", at(3, 1, 23, 0)))
            .unwrap();

        let start = at(3, 3, 9, 0);
        let mut scheduler = EventScheduler::new(&SchedulerConfig::default(), start);
        let report = scheduler.tick(start, &mut companion);
        assert!(matches!(&report.events[..], [CompanionEvent::Reminder { .. }]));

        let again = scheduler.tick(at(3, 3, 10, 0), &mut companion);
        assert!(again.events.is_empty());
    }
}
