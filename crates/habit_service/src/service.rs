use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use habit_core::calendar::{self, Month, WeekRow};
use habit_core::filter::{self, HabitFilter};
use habit_core::snapshot::STORAGE_KEY;
use habit_core::stats::{
    self, DailyStat, HabitStats, MonthlyStats, RankedHabit, WeeklyStat, YesterdayStats,
};
use habit_core::streak::{self, StreakData};
use habit_core::undo::{HabitCommand, PendingUndo, UndoSlot};
use habit_core::{Habit, HabitData, HabitId, HabitStatus, LoadOutcome, NewHabit};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::config::ServiceConfig;
use crate::store::{JsonDirStore, KeyValueStore, MemoryStore};

/// Source of the local calendar day treated as "today".
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().date_naive())
}

/// Owns the snapshot, routes every mutation through a full write to the
/// store, and answers queries relative to the injected clock.
pub struct HabitService {
    store: Box<dyn KeyValueStore>,
    data: RwLock<HabitData>,
    undo: Mutex<UndoSlot>,
    last_saved: RwLock<Option<DateTime<Utc>>>,
    clock: Clock,
    load_outcome: LoadOutcome,
}

pub struct HabitServiceBuilder {
    store: Option<Box<dyn KeyValueStore>>,
    clock: Clock,
    undo_window: Duration,
}

impl HabitServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            clock: system_clock(),
            undo_window: UndoSlot::default().window(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let mut builder = Self::new()
            .with_store(JsonDirStore::new(&config.data_dir))
            .with_undo_window(config.undo_window());
        if let Some(today) = config.mock_today {
            builder = builder.with_fixed_today(today);
        }
        builder
    }

    pub fn with_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_fixed_today(self, today: NaiveDate) -> Self {
        self.with_clock(move || today)
    }

    pub fn with_undo_window(mut self, window: Duration) -> Self {
        self.undo_window = window;
        self
    }

    /// Loads the stored snapshot. Unreadable content falls back to the
    /// default snapshot; only a failing store read is an error.
    pub fn build(self) -> Result<HabitService> {
        let store = self
            .store
            .unwrap_or_else(|| Box::new(MemoryStore::new()) as Box<dyn KeyValueStore>);
        let today = (self.clock)();
        let raw = store
            .get(STORAGE_KEY)
            .context("reading stored habit snapshot")?;
        let (data, load_outcome) = HabitData::load_or_default(raw.as_deref(), today);
        info!(
            habits = data.habits.len(),
            entries = data.entries.len(),
            join_date = %data.join_date,
            outcome = ?load_outcome,
            "habit snapshot ready"
        );

        let service = HabitService {
            store,
            data: RwLock::new(data),
            undo: Mutex::new(UndoSlot::new(self.undo_window)),
            last_saved: RwLock::new(None),
            clock: self.clock,
            load_outcome,
        };
        if load_outcome != LoadOutcome::Loaded {
            service.persist(&service.data.read());
        }
        Ok(service)
    }
}

impl Default for HabitServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitService {
    pub fn builder() -> HabitServiceBuilder {
        HabitServiceBuilder::new()
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        *self.last_saved.read()
    }

    pub fn snapshot(&self) -> HabitData {
        self.data.read().clone()
    }

    /// Runs a read-only query against the current snapshot.
    pub fn read<R>(&self, query: impl FnOnce(&HabitData) -> R) -> R {
        query(&self.data.read())
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.read(|data| data.habits.clone())
    }

    pub fn join_date(&self) -> NaiveDate {
        self.read(|data| data.join_date)
    }

    // Mutations

    #[instrument(skip(self))]
    pub fn add_habit(&self, fields: NewHabit) -> Habit {
        self.commit(|data| data.add_habit(fields))
    }

    #[instrument(skip(self))]
    pub fn update_habit(&self, habit: Habit) -> bool {
        self.mutate(|data| data.update_habit(habit)).is_some()
    }

    /// Removes the habit and its statuses. This is the only mutation that
    /// offers undo, which brings the habit back without its statuses.
    #[instrument(skip(self))]
    pub fn remove_habit(&self, habit_id: &HabitId) -> Option<Habit> {
        let today = self.today();
        let inverse = self.mutate(|data| HabitCommand::Remove(habit_id.clone()).apply(data, today))?;
        let HabitCommand::Restore(removed) = &inverse else {
            return None;
        };
        let removed = removed.clone();
        self.record_undo(format!("Deleted {}", removed.name), inverse);
        Some(removed)
    }

    #[instrument(skip(self))]
    pub fn restore_habit(&self, habit: Habit) {
        self.commit(|data| data.restore_habit(habit));
    }

    #[instrument(skip(self))]
    pub fn toggle_status(&self, habit_id: &HabitId, date: NaiveDate) -> Option<HabitStatus> {
        let today = self.today();
        self.mutate(|data| data.toggle(habit_id, date, today))
    }

    /// Direct write without the join-date guard; see
    /// [`HabitData::set_status`].
    #[instrument(skip(self))]
    pub fn set_status(&self, habit_id: &HabitId, date: NaiveDate, status: HabitStatus) -> bool {
        self.mutate(|data| data.set_status(habit_id, date, status).then_some(()))
            .is_some()
    }

    /// Reverts the most recent delete if its window is still open. Returns
    /// the label it was recorded with.
    #[instrument(skip(self))]
    pub fn undo(&self) -> Option<String> {
        let pending = self.undo.lock().take(Utc::now())?;
        let today = self.today();
        match self.mutate(|data| pending.inverse.clone().apply(data, today)) {
            Some(_) => {
                info!(label = %pending.label, "undone");
                Some(pending.label)
            }
            None => {
                debug!(label = %pending.label, "undo had nothing to revert");
                None
            }
        }
    }

    pub fn pending_undo(&self) -> Option<PendingUndo> {
        self.undo.lock().peek(Utc::now()).cloned()
    }

    pub fn clear_undo(&self) {
        self.undo.lock().clear();
    }

    // Queries

    pub fn status_on(&self, habit_id: &HabitId, date: NaiveDate) -> HabitStatus {
        let today = self.today();
        self.read(|data| data.status_on(habit_id, date, today))
    }

    pub fn is_date_before_join(&self, date: NaiveDate) -> bool {
        self.read(|data| data.is_date_before_join(date))
    }

    pub fn streak(&self, habit_id: &HabitId) -> StreakData {
        let today = self.today();
        self.read(|data| streak::streak_for(data, habit_id, today))
    }

    pub fn streaks(&self) -> HashMap<HabitId, StreakData> {
        let today = self.today();
        self.read(|data| streak::streaks_for(data, &data.habit_ids(), today))
    }

    pub fn habit_stats(&self, habit_id: &HabitId, month: Month) -> HabitStats {
        self.read(|data| stats::habit_stats(data, habit_id, month))
    }

    pub fn monthly_stats(&self, month: Month) -> MonthlyStats {
        self.read(|data| stats::monthly_stats(data, month))
    }

    pub fn daily_stats(&self, month: Month) -> Vec<DailyStat> {
        self.read(|data| stats::daily_stats(data, month))
    }

    pub fn weekly_stats(&self, month: Month) -> Vec<WeeklyStat> {
        self.read(|data| stats::weekly_stats(data, month))
    }

    pub fn top_habits(&self, month: Month, limit: usize) -> Vec<RankedHabit> {
        self.read(|data| stats::top_habits(data, month, limit))
    }

    pub fn yesterday_stats(&self) -> YesterdayStats {
        let today = self.today();
        self.read(|data| stats::yesterday_stats(data, today))
    }

    pub fn week_progress(&self, week: &WeekRow) -> u32 {
        self.read(|data| stats::week_progress(data, week))
    }

    pub fn is_week_complete(&self, week: &WeekRow) -> bool {
        let today = self.today();
        self.read(|data| stats::is_week_complete(data, week, today))
    }

    pub fn filter_habits(&self, query: &str, status_filter: HabitFilter) -> Vec<Habit> {
        let today = self.today();
        self.read(|data| {
            filter::filter_habits(data, query, status_filter, today)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn current_month(&self) -> Month {
        Month::containing(self.today())
    }

    /// Grid row of the current month that holds today.
    pub fn current_week(&self) -> Option<WeekRow> {
        let today = self.today();
        let month = Month::containing(today);
        let index = calendar::week_index_of(month, today)?;
        calendar::month_grid(month).get(index - 1).copied()
    }
}

impl HabitService {
    /// Applies `change` to a copy of the snapshot and swaps it in only when
    /// the change reports a result, then writes the whole snapshot out.
    fn mutate<R>(&self, change: impl FnOnce(&mut HabitData) -> Option<R>) -> Option<R> {
        let mut guard = self.data.write();
        let mut next = guard.clone();
        let outcome = change(&mut next)?;
        *guard = next;
        self.persist(&guard);
        Some(outcome)
    }

    /// Like [`mutate`](Self::mutate) for changes that always apply.
    fn commit<R>(&self, change: impl FnOnce(&mut HabitData) -> R) -> R {
        let mut guard = self.data.write();
        let mut next = guard.clone();
        let outcome = change(&mut next);
        *guard = next;
        self.persist(&guard);
        outcome
    }

    fn record_undo(&self, label: String, inverse: HabitCommand) {
        self.undo.lock().record(label, inverse, Utc::now());
    }

    /// Best effort: a failed write is logged and the in-memory snapshot kept.
    fn persist(&self, data: &HabitData) {
        let payload = match data.to_json() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, "unable to encode habit snapshot");
                return;
            }
        };
        match self.store.set(STORAGE_KEY, &payload) {
            Ok(()) => {
                debug!(bytes = payload.len(), "habit snapshot saved");
                *self.last_saved.write() = Some(Utc::now());
            }
            Err(err) => warn!(err = %format!("{err:#}"), "unable to save habit snapshot"),
        }
    }
}
