//! In-memory repository used by the server and by tests.
//!
//! All records live behind a single `tokio::sync::RwLock`. A unit of work
//! holds the write half of that lock for its whole lifetime and mutates a
//! staged copy of the data, which replaces the live copy on commit.
//!
//! Failures can be injected through [`LocalRepository::set_healthy`],
//! [`LocalRepository::fail_writes_after`] and
//! [`LocalRepository::fail_operation`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::Mutex;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, ScheduleRepository, TaskRepository,
    TransactionalRepository, UnitOfWork, VisitRepository,
};
use crate::models::{
    Coordinates, DurationStats, Paginated, Schedule, ScheduleId, ScheduleStatus,
    ScheduleWithDetails, StatusCounts, Task, TaskId, TaskStatus, TaskStatusChange, Visit, VisitId,
    VisitStatus,
};

trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

impl Timestamped for Schedule {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for Visit {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for Task {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A stored record plus its insertion sequence, used to break ties between
/// records created within the same clock tick.
#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    record: T,
}

fn oldest_first<'a, T, I>(rows: I) -> Vec<T>
where
    T: Timestamped + Clone + 'a,
    I: IntoIterator<Item = &'a Row<T>>,
{
    let mut rows: Vec<&Row<T>> = rows.into_iter().collect();
    rows.sort_by(|a, b| {
        a.record
            .created_at()
            .cmp(&b.record.created_at())
            .then(a.seq.cmp(&b.seq))
    });
    rows.into_iter().map(|row| row.record.clone()).collect()
}

fn newest_first<'a, T, I>(rows: I) -> Vec<T>
where
    T: Timestamped + Clone + 'a,
    I: IntoIterator<Item = &'a Row<T>>,
{
    let mut records = oldest_first(rows);
    records.reverse();
    records
}

fn not_found(operation: &str, entity: &str, id: impl ToString) -> RepositoryError {
    RepositoryError::not_found(
        format!("{} not found", entity),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

#[derive(Debug, Clone, Default)]
struct LocalData {
    schedules: HashMap<ScheduleId, Row<Schedule>>,
    visits: HashMap<VisitId, Row<Visit>>,
    tasks: HashMap<TaskId, Row<Task>>,
    next_seq: u64,
}

impl LocalData {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn schedule(&self, operation: &str, id: ScheduleId) -> RepositoryResult<&Schedule> {
        self.schedules
            .get(&id)
            .map(|row| &row.record)
            .ok_or_else(|| not_found(operation, "schedule", id))
    }

    fn schedule_mut(&mut self, operation: &str, id: ScheduleId) -> RepositoryResult<&mut Schedule> {
        self.schedules
            .get_mut(&id)
            .map(|row| &mut row.record)
            .ok_or_else(|| not_found(operation, "schedule", id))
    }

    fn visit_mut(&mut self, operation: &str, id: VisitId) -> RepositoryResult<&mut Visit> {
        self.visits
            .get_mut(&id)
            .map(|row| &mut row.record)
            .ok_or_else(|| not_found(operation, "visit", id))
    }

    fn task_mut(&mut self, operation: &str, id: TaskId) -> RepositoryResult<&mut Task> {
        self.tasks
            .get_mut(&id)
            .map(|row| &mut row.record)
            .ok_or_else(|| not_found(operation, "task", id))
    }

    fn latest_visit_for(&self, schedule_id: ScheduleId) -> Option<Visit> {
        newest_first(
            self.visits
                .values()
                .filter(|row| row.record.schedule_id == schedule_id),
        )
        .into_iter()
        .next()
    }

    fn has_visit(&self, schedule_id: ScheduleId) -> bool {
        self.visits
            .values()
            .any(|row| row.record.schedule_id == schedule_id)
    }

    fn tasks_for(&self, schedule_id: ScheduleId) -> Vec<Task> {
        oldest_first(
            self.tasks
                .values()
                .filter(|row| row.record.schedule_id == schedule_id),
        )
    }

    fn insert_schedule(&mut self, schedule: &Schedule) {
        let seq = self.next_seq();
        self.schedules.insert(
            schedule.id,
            Row {
                seq,
                record: schedule.clone(),
            },
        );
    }

    fn insert_visit(&mut self, operation: &str, visit: &Visit) -> RepositoryResult<()> {
        self.schedule(operation, visit.schedule_id)?;
        if self.has_visit(visit.schedule_id) {
            return Err(RepositoryError::constraint(
                "a visit already exists for this schedule",
                ErrorContext::new(operation)
                    .with_entity("visit")
                    .with_entity_id(visit.schedule_id),
            ));
        }

        let seq = self.next_seq();
        self.visits.insert(
            visit.id,
            Row {
                seq,
                record: visit.clone(),
            },
        );
        let schedule = self.schedule_mut(operation, visit.schedule_id)?;
        schedule.visit_id = Some(visit.id);
        schedule.updated_at = Utc::now();
        Ok(())
    }

    fn end_visit(
        &mut self,
        operation: &str,
        id: VisitId,
        end_time: DateTime<Utc>,
        location: Coordinates,
    ) -> RepositoryResult<Visit> {
        let visit = self.visit_mut(operation, id)?;
        visit.finish(end_time, location);
        Ok(visit.clone())
    }

    fn set_schedule_status(
        &mut self,
        operation: &str,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> RepositoryResult<()> {
        let schedule = self.schedule_mut(operation, id)?;
        schedule.status = status;
        schedule.updated_at = Utc::now();
        Ok(())
    }

    fn insert_task(&mut self, operation: &str, task: &Task) -> RepositoryResult<()> {
        self.schedule(operation, task.schedule_id)?;
        let seq = self.next_seq();
        self.tasks.insert(
            task.id,
            Row {
                seq,
                record: task.clone(),
            },
        );
        Ok(())
    }
}

/// Injected failures, consulted before every operation.
#[derive(Debug, Default)]
struct Faults {
    unhealthy: bool,
    writes_left: Option<usize>,
    failing: HashSet<String>,
}

impl Faults {
    fn check(&mut self, operation: &str, write: bool) -> RepositoryResult<()> {
        if self.unhealthy {
            return Err(RepositoryError::unavailable(
                "store unavailable",
                ErrorContext::new(operation),
            ));
        }
        if self.failing.contains(operation) {
            return Err(RepositoryError::query(
                "injected failure",
                ErrorContext::new(operation),
            ));
        }
        if write {
            match self.writes_left {
                Some(0) => {
                    return Err(RepositoryError::query(
                        "write budget exhausted",
                        ErrorContext::new(operation),
                    ));
                }
                Some(ref mut left) => *left -= 1,
                None => {}
            }
        }
        Ok(())
    }
}

/// In-memory implementation of every repository trait.
#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    faults: Arc<Mutex<Faults>>,
}

impl LocalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle store availability. While unhealthy every operation fails with
    /// a connection error and `health_check` reports `false`.
    pub fn set_healthy(&self, healthy: bool) {
        self.faults.lock().unhealthy = !healthy;
    }

    /// Allow `n` more writes, then fail every write until faults are cleared.
    pub fn fail_writes_after(&self, n: usize) {
        self.faults.lock().writes_left = Some(n);
    }

    /// Fail every call of the named operation (e.g. `"update_schedule_status"`).
    pub fn fail_operation(&self, operation: &str) {
        self.faults.lock().failing.insert(operation.to_string());
    }

    /// Remove every injected failure.
    pub fn clear_faults(&self) {
        *self.faults.lock() = Faults::default();
    }

    fn check(&self, operation: &str) -> RepositoryResult<()> {
        self.faults.lock().check(operation, false)
    }

    fn check_write(&self, operation: &str) -> RepositoryResult<()> {
        self.faults.lock().check(operation, true)
    }
}

#[async_trait]
impl ScheduleRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(!self.faults.lock().unhealthy)
    }

    async fn list_schedules(
        &self,
        page: usize,
        limit: usize,
        status: Option<ScheduleStatus>,
    ) -> RepositoryResult<Paginated<Schedule>> {
        self.check("list_schedules")?;
        let data = self.data.read().await;
        let rows = data
            .schedules
            .values()
            .filter(|row| status.map_or(true, |s| row.record.status == s));
        Ok(Paginated::from_ordered(newest_first(rows), page, limit))
    }

    async fn list_today_schedules(&self) -> RepositoryResult<Vec<Schedule>> {
        self.check("list_today_schedules")?;
        let today = Utc::now().date_naive();
        let data = self.data.read().await;
        let mut rows: Vec<&Row<Schedule>> = data
            .schedules
            .values()
            .filter(|row| row.record.created_at.date_naive() == today)
            .collect();
        rows.sort_by(|a, b| {
            a.record
                .shift_time
                .cmp(&b.record.shift_time)
                .then(a.seq.cmp(&b.seq))
        });
        Ok(rows.into_iter().map(|row| row.record.clone()).collect())
    }

    async fn get_schedule(&self, id: ScheduleId) -> RepositoryResult<Schedule> {
        self.check("get_schedule")?;
        let data = self.data.read().await;
        data.schedule("get_schedule", id).cloned()
    }

    async fn get_schedule_with_details(
        &self,
        id: ScheduleId,
    ) -> RepositoryResult<ScheduleWithDetails> {
        self.check("get_schedule_with_details")?;
        let data = self.data.read().await;
        let schedule = data.schedule("get_schedule_with_details", id)?.clone();
        Ok(ScheduleWithDetails {
            visit: data.latest_visit_for(id),
            tasks: data.tasks_for(id),
            schedule,
        })
    }

    async fn create_schedule(&self, schedule: &Schedule) -> RepositoryResult<()> {
        self.check_write("create_schedule")?;
        let mut data = self.data.write().await;
        data.insert_schedule(schedule);
        debug!("Stored schedule {}", schedule.id);
        Ok(())
    }

    async fn update_schedule(&self, schedule: &Schedule) -> RepositoryResult<()> {
        self.check_write("update_schedule")?;
        let mut data = self.data.write().await;
        let stored = data.schedule_mut("update_schedule", schedule.id)?;
        *stored = schedule.clone();
        debug!("Updated schedule {}", schedule.id);
        Ok(())
    }

    async fn update_schedule_status(
        &self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> RepositoryResult<()> {
        self.check_write("update_schedule_status")?;
        let mut data = self.data.write().await;
        data.set_schedule_status("update_schedule_status", id, status)?;
        debug!("Schedule {} status set to {}", id, status);
        Ok(())
    }

    async fn delete_schedule(&self, id: ScheduleId) -> RepositoryResult<()> {
        self.check_write("delete_schedule")?;
        let mut data = self.data.write().await;
        if data.schedules.remove(&id).is_none() {
            return Err(not_found("delete_schedule", "schedule", id));
        }
        data.visits.retain(|_, row| row.record.schedule_id != id);
        data.tasks.retain(|_, row| row.record.schedule_id != id);
        debug!("Deleted schedule {} with its visit and tasks", id);
        Ok(())
    }

    async fn schedule_stats(&self) -> RepositoryResult<StatusCounts> {
        self.check("schedule_stats")?;
        let data = self.data.read().await;
        let mut counts = StatusCounts::default();
        for row in data.schedules.values() {
            counts.total += 1;
            match row.record.status {
                ScheduleStatus::Completed => counts.completed += 1,
                ScheduleStatus::Upcoming | ScheduleStatus::InProgress => counts.pending += 1,
                ScheduleStatus::Missed => counts.not_completed += 1,
            }
        }
        Ok(counts)
    }

    async fn search_schedules(
        &self,
        query: &str,
        page: usize,
        limit: usize,
    ) -> RepositoryResult<Paginated<Schedule>> {
        self.check("search_schedules")?;
        let data = self.data.read().await;
        let rows = data
            .schedules
            .values()
            .filter(|row| row.record.matches_query(query));
        Ok(Paginated::from_ordered(newest_first(rows), page, limit))
    }
}

#[async_trait]
impl VisitRepository for LocalRepository {
    async fn get_visit(&self, id: VisitId) -> RepositoryResult<Visit> {
        self.check("get_visit")?;
        let data = self.data.read().await;
        data.visits
            .get(&id)
            .map(|row| row.record.clone())
            .ok_or_else(|| not_found("get_visit", "visit", id))
    }

    async fn get_visit_by_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<Visit> {
        self.check("get_visit_by_schedule")?;
        let data = self.data.read().await;
        data.latest_visit_for(schedule_id)
            .ok_or_else(|| not_found("get_visit_by_schedule", "visit", schedule_id))
    }

    async fn create_visit(&self, visit: &Visit) -> RepositoryResult<()> {
        self.check_write("create_visit")?;
        let mut data = self.data.write().await;
        data.insert_visit("create_visit", visit)?;
        debug!("Stored visit {} for schedule {}", visit.id, visit.schedule_id);
        Ok(())
    }

    async fn start_visit(
        &self,
        schedule_id: ScheduleId,
        start_time: DateTime<Utc>,
        location: Coordinates,
    ) -> RepositoryResult<Visit> {
        self.check_write("start_visit")?;
        let visit = Visit::begin(schedule_id, start_time, location);
        let mut data = self.data.write().await;
        data.insert_visit("start_visit", &visit)?;
        debug!("Started visit {} for schedule {}", visit.id, schedule_id);
        Ok(visit)
    }

    async fn end_visit(
        &self,
        id: VisitId,
        end_time: DateTime<Utc>,
        location: Coordinates,
    ) -> RepositoryResult<Visit> {
        self.check_write("end_visit")?;
        let mut data = self.data.write().await;
        let visit = data.end_visit("end_visit", id, end_time, location)?;
        debug!("Ended visit {}", id);
        Ok(visit)
    }

    async fn update_visit_status(&self, id: VisitId, status: VisitStatus) -> RepositoryResult<()> {
        self.check_write("update_visit_status")?;
        let mut data = self.data.write().await;
        let visit = data.visit_mut("update_visit_status", id)?;
        let rejection = if !visit.status.can_move_to(status) {
            Some(format!("visit cannot move from {} to {}", visit.status, status))
        } else if status == VisitStatus::Completed && visit.end_time.is_none() {
            Some("a visit is completed only by checking out".to_string())
        } else {
            None
        };
        if let Some(message) = rejection {
            return Err(RepositoryError::constraint(
                message,
                ErrorContext::new("update_visit_status")
                    .with_entity("visit")
                    .with_entity_id(id),
            ));
        }
        visit.status = status;
        visit.updated_at = Utc::now();
        debug!("Visit {} status set to {}", id, status);
        Ok(())
    }

    async fn visit_exists_for_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<bool> {
        self.check("visit_exists_for_schedule")?;
        Ok(self.data.read().await.has_visit(schedule_id))
    }

    async fn visit_stats(&self) -> RepositoryResult<StatusCounts> {
        self.check("visit_stats")?;
        let data = self.data.read().await;
        let mut counts = StatusCounts::default();
        for row in data.visits.values() {
            counts.total += 1;
            match row.record.status {
                VisitStatus::Completed => counts.completed += 1,
                VisitStatus::InProgress => counts.pending += 1,
                VisitStatus::NotStarted => counts.not_completed += 1,
            }
        }
        Ok(counts)
    }

    async fn visit_duration_stats(&self) -> RepositoryResult<DurationStats> {
        self.check("visit_duration_stats")?;
        let data = self.data.read().await;
        Ok(DurationStats::from_minutes(
            data.visits
                .values()
                .filter_map(|row| row.record.duration_minutes()),
        ))
    }

    async fn list_visits_by_status(&self, status: VisitStatus) -> RepositoryResult<Vec<Visit>> {
        self.check("list_visits_by_status")?;
        let data = self.data.read().await;
        Ok(newest_first(
            data.visits
                .values()
                .filter(|row| row.record.status == status),
        ))
    }
}

#[async_trait]
impl TaskRepository for LocalRepository {
    async fn get_task(&self, id: TaskId) -> RepositoryResult<Task> {
        self.check("get_task")?;
        let data = self.data.read().await;
        data.tasks
            .get(&id)
            .map(|row| row.record.clone())
            .ok_or_else(|| not_found("get_task", "task", id))
    }

    async fn list_tasks_by_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<Vec<Task>> {
        self.check("list_tasks_by_schedule")?;
        Ok(self.data.read().await.tasks_for(schedule_id))
    }

    async fn list_tasks_by_status(&self, status: TaskStatus) -> RepositoryResult<Vec<Task>> {
        self.check("list_tasks_by_status")?;
        let data = self.data.read().await;
        Ok(newest_first(
            data.tasks.values().filter(|row| row.record.status == status),
        ))
    }

    async fn list_incomplete_tasks_with_reason(&self) -> RepositoryResult<Vec<Task>> {
        self.check("list_incomplete_tasks_with_reason")?;
        let data = self.data.read().await;
        Ok(newest_first(data.tasks.values().filter(|row| {
            row.record.is_not_completed() && row.record.has_reason()
        })))
    }

    async fn create_task(&self, task: &Task) -> RepositoryResult<()> {
        self.check_write("create_task")?;
        let mut data = self.data.write().await;
        data.insert_task("create_task", task)?;
        debug!("Stored task {} for schedule {}", task.id, task.schedule_id);
        Ok(())
    }

    async fn create_tasks_batch(&self, tasks: &[Task]) -> RepositoryResult<()> {
        let mut data = self.data.write().await;
        for (index, task) in tasks.iter().enumerate() {
            self.check_write("create_tasks_batch")
                .and_then(|_| data.insert_task("create_tasks_batch", task))
                .inspect_err(|_| {
                    debug!("Task batch stopped at row {} of {}", index, tasks.len());
                })?;
        }
        debug!("Stored {} tasks", tasks.len());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> RepositoryResult<()> {
        self.check_write("update_task")?;
        let mut data = self.data.write().await;
        let stored = data.task_mut("update_task", task.id)?;
        *stored = task.clone();
        debug!("Updated task {}", task.id);
        Ok(())
    }

    async fn update_task_status(
        &self,
        id: TaskId,
        change: &TaskStatusChange,
    ) -> RepositoryResult<Task> {
        self.check_write("update_task_status")?;
        let mut data = self.data.write().await;
        let task = data.task_mut("update_task_status", id)?;
        task.apply_status(change, Utc::now());
        debug!("Task {} status set to {}", id, task.status);
        Ok(task.clone())
    }

    async fn update_task_reason(&self, id: TaskId, reason: &str) -> RepositoryResult<()> {
        self.check_write("update_task_reason")?;
        let mut data = self.data.write().await;
        let task = data.task_mut("update_task_reason", id)?;
        task.reason = Some(reason.to_string());
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn task_exists(&self, id: TaskId) -> RepositoryResult<bool> {
        self.check("task_exists")?;
        Ok(self.data.read().await.tasks.contains_key(&id))
    }

    async fn delete_task(&self, id: TaskId) -> RepositoryResult<()> {
        self.check_write("delete_task")?;
        let mut data = self.data.write().await;
        if data.tasks.remove(&id).is_none() {
            return Err(not_found("delete_task", "task", id));
        }
        debug!("Deleted task {}", id);
        Ok(())
    }

    async fn task_completion_rate(&self, schedule_id: ScheduleId) -> RepositoryResult<f64> {
        self.check("task_completion_rate")?;
        let data = self.data.read().await;
        Ok(StatusCounts::from_tasks(&data.tasks_for(schedule_id)).completion_rate())
    }

    async fn task_stats_by_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> RepositoryResult<StatusCounts> {
        self.check("task_stats_by_schedule")?;
        let data = self.data.read().await;
        Ok(StatusCounts::from_tasks(&data.tasks_for(schedule_id)))
    }

    async fn overall_task_stats(&self) -> RepositoryResult<StatusCounts> {
        self.check("overall_task_stats")?;
        let data = self.data.read().await;
        Ok(StatusCounts::from_tasks(
            data.tasks.values().map(|row| &row.record),
        ))
    }
}

/// Unit of work over a staged copy of [`LocalData`].
///
/// Holding the owned write guard keeps every other reader and writer out
/// until the unit of work is committed or dropped.
struct LocalUnitOfWork {
    guard: OwnedRwLockWriteGuard<LocalData>,
    staged: LocalData,
    faults: Arc<Mutex<Faults>>,
}

impl LocalUnitOfWork {
    fn check(&self, operation: &str, write: bool) -> RepositoryResult<()> {
        self.faults.lock().check(operation, write)
    }
}

#[async_trait]
impl UnitOfWork for LocalUnitOfWork {
    async fn visit_exists_for_schedule(
        &mut self,
        schedule_id: ScheduleId,
    ) -> RepositoryResult<bool> {
        self.check("visit_exists_for_schedule", false)?;
        Ok(self.staged.has_visit(schedule_id))
    }

    async fn visit_by_schedule_id(&mut self, schedule_id: ScheduleId) -> RepositoryResult<Visit> {
        self.check("get_visit_by_schedule", false)?;
        self.staged
            .latest_visit_for(schedule_id)
            .ok_or_else(|| not_found("get_visit_by_schedule", "visit", schedule_id))
    }

    async fn insert_visit(&mut self, visit: &Visit) -> RepositoryResult<()> {
        self.check("create_visit", true)?;
        self.staged.insert_visit("create_visit", visit)
    }

    async fn end_visit(
        &mut self,
        id: VisitId,
        end_time: DateTime<Utc>,
        location: Coordinates,
    ) -> RepositoryResult<Visit> {
        self.check("end_visit", true)?;
        self.staged.end_visit("end_visit", id, end_time, location)
    }

    async fn update_schedule_status(
        &mut self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> RepositoryResult<()> {
        self.check("update_schedule_status", true)?;
        self.staged
            .set_schedule_status("update_schedule_status", id, status)
    }

    fn commit(self: Box<Self>) -> RepositoryResult<()> {
        if let Err(cause) = self.check("commit", false) {
            return Err(RepositoryError::transaction(
                format!("staged changes discarded: {}", cause),
                ErrorContext::new("commit"),
            ));
        }
        let LocalUnitOfWork {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        debug!("Unit of work committed");
        Ok(())
    }
}

#[async_trait]
impl TransactionalRepository for LocalRepository {
    async fn begin(&self) -> RepositoryResult<Box<dyn UnitOfWork>> {
        self.check("begin")?;
        let guard = Arc::clone(&self.data).write_owned().await;
        let staged = guard.clone();
        Ok(Box::new(LocalUnitOfWork {
            guard,
            staged,
            faults: Arc::clone(&self.faults),
        }))
    }
}
