use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::calendar::{format_day_key, parse_day_key, DAY_KEY_LEN};
use crate::habit::HabitId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    Empty,
    Completed,
    Missed,
    Skipped,
    /// Derived for days before the join date; never stored by a toggle.
    Paused,
}

/// Order a cell moves through when toggled.
pub const TOGGLE_CYCLE: [HabitStatus; 4] = [
    HabitStatus::Empty,
    HabitStatus::Completed,
    HabitStatus::Missed,
    HabitStatus::Skipped,
];

impl HabitStatus {
    /// Next status in the toggle cycle. `Paused` has no successor.
    pub fn next_in_cycle(self) -> Option<HabitStatus> {
        let idx = TOGGLE_CYCLE.iter().position(|status| *status == self)?;
        Some(TOGGLE_CYCLE[(idx + 1) % TOGGLE_CYCLE.len()])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HabitStatus::Empty => "empty",
            HabitStatus::Completed => "completed",
            HabitStatus::Missed => "missed",
            HabitStatus::Skipped => "skipped",
            HabitStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for HabitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicitly recorded statuses, grouped per habit.
///
/// On the wire this is the flat `{"<habit id>-<YYYY-MM-DD>": status}` object
/// the snapshot has always used. The date is a fixed-width suffix, so ids
/// containing `-` split unambiguously.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLog(BTreeMap<HabitId, BTreeMap<NaiveDate, HabitStatus>>);

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, habit_id: &HabitId, date: NaiveDate) -> Option<HabitStatus> {
        self.0.get(habit_id)?.get(&date).copied()
    }

    pub fn is_completed(&self, habit_id: &HabitId, date: NaiveDate) -> bool {
        self.get(habit_id, date) == Some(HabitStatus::Completed)
    }

    pub fn insert(
        &mut self,
        habit_id: HabitId,
        date: NaiveDate,
        status: HabitStatus,
    ) -> Option<HabitStatus> {
        self.0.entry(habit_id).or_default().insert(date, status)
    }

    pub fn remove(&mut self, habit_id: &HabitId, date: NaiveDate) -> Option<HabitStatus> {
        let days = self.0.get_mut(habit_id)?;
        let previous = days.remove(&date);
        if days.is_empty() {
            self.0.remove(habit_id);
        }
        previous
    }

    /// Drops every entry of the habit at once.
    pub fn remove_habit(&mut self, habit_id: &HabitId) -> usize {
        self.0.remove(habit_id).map_or(0, |days| days.len())
    }

    pub fn contains_habit(&self, habit_id: &HabitId) -> bool {
        self.0.contains_key(habit_id)
    }

    pub fn habit_entries(
        &self,
        habit_id: &HabitId,
    ) -> impl Iterator<Item = (NaiveDate, HabitStatus)> + '_ {
        self.0
            .get(habit_id)
            .into_iter()
            .flat_map(|days| days.iter().map(|(date, status)| (*date, *status)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HabitId, NaiveDate, HabitStatus)> + '_ {
        self.0.iter().flat_map(|(id, days)| {
            days.iter().map(move |(date, status)| (id, *date, *status))
        })
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn entry_key(habit_id: &HabitId, date: NaiveDate) -> String {
    format!("{}-{}", habit_id, format_day_key(date))
}

/// Splits `"<habit id>-<YYYY-MM-DD>"` into its parts.
pub fn split_entry_key(key: &str) -> Option<(HabitId, NaiveDate)> {
    let split_at = key.len().checked_sub(DAY_KEY_LEN)?;
    if !key.is_char_boundary(split_at) {
        return None;
    }
    let (head, day) = key.split_at(split_at);
    let id = head.strip_suffix('-')?;
    if id.is_empty() {
        return None;
    }
    let date = parse_day_key(day).ok()?;
    Some((HabitId::new(id), date))
}

impl Serialize for StatusLog {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, date, status) in self.iter() {
            map.serialize_entry(&entry_key(id, date), &status)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatusLog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let flat: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
        let mut log = StatusLog::new();
        for (key, value) in flat {
            let Some((id, date)) = split_entry_key(&key) else {
                tracing::warn!(%key, "dropping entry with unreadable key");
                continue;
            };
            match HabitStatus::deserialize(&value) {
                Ok(status) => {
                    log.insert(id, date, status);
                }
                Err(err) => tracing::warn!(%key, %value, %err, "dropping entry with unreadable status"),
            }
        }
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn toggle_cycle_wraps_and_skips_paused() {
        assert_eq!(HabitStatus::Empty.next_in_cycle(), Some(HabitStatus::Completed));
        assert_eq!(HabitStatus::Completed.next_in_cycle(), Some(HabitStatus::Missed));
        assert_eq!(HabitStatus::Missed.next_in_cycle(), Some(HabitStatus::Skipped));
        assert_eq!(HabitStatus::Skipped.next_in_cycle(), Some(HabitStatus::Empty));
        assert_eq!(HabitStatus::Paused.next_in_cycle(), None);
    }

    #[test]
    fn splits_keys_on_the_date_suffix() {
        let (id, date) = split_entry_key("social-media-2024-03-11").unwrap();
        assert_eq!(id.as_str(), "social-media");
        assert_eq!(date, day(2024, 3, 11));

        assert!(split_entry_key("2024-03-11").is_none());
        assert!(split_entry_key("-2024-03-11").is_none());
        assert!(split_entry_key("read-2024-3-11").is_none());
        assert!(split_entry_key("read").is_none());
        assert!(split_entry_key("📘📘📘📘").is_none());
    }

    #[test]
    fn wire_format_is_flat() {
        let mut log = StatusLog::new();
        log.insert(HabitId::new("read"), day(2024, 3, 11), HabitStatus::Completed);
        log.insert(HabitId::new("read-more"), day(2024, 3, 11), HabitStatus::Missed);

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["read-2024-03-11"], "completed");
        assert_eq!(json["read-more-2024-03-11"], "missed");

        let decoded: StatusLog = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, log);
    }

    #[test]
    fn unreadable_keys_are_dropped() {
        let decoded: StatusLog = serde_json::from_str(
            r#"{"read-2024-03-11": "completed", "garbage": "missed"}"#,
        )
        .unwrap();
        assert_eq!(decoded.len(), 1);
        assert!(decoded.is_completed(&HabitId::new("read"), day(2024, 3, 11)));
    }

    #[test]
    fn unreadable_statuses_are_dropped() {
        let decoded: StatusLog = serde_json::from_str(
            r#"{"read-2024-03-11": "done", "read-2024-03-12": null, "read-2024-03-13": "skipped"}"#,
        )
        .unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(
            decoded.get(&HabitId::new("read"), day(2024, 3, 13)),
            Some(HabitStatus::Skipped)
        );
    }

    #[test]
    fn removing_a_habit_drops_only_its_entries() {
        let mut log = StatusLog::new();
        let read = HabitId::new("read");
        let read_more = HabitId::new("read-more");
        log.insert(read.clone(), day(2024, 3, 11), HabitStatus::Completed);
        log.insert(read.clone(), day(2024, 3, 12), HabitStatus::Missed);
        log.insert(read_more.clone(), day(2024, 3, 11), HabitStatus::Completed);

        assert_eq!(log.remove_habit(&read), 2);
        assert!(!log.contains_habit(&read));
        assert_eq!(log.habit_entries(&read_more).count(), 1);
    }
}
