use crate::dates::{date_key, format_week_label, iso_week_key};
use crate::models::{
    DailyPoint, GroupBy, GroupedWeeklyRow, GroupedWeeklyVolume, LogEntry, PersonalRecord,
    WeeklyPoint,
};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

const UNKNOWN_EXERCISE: &str = "Unknown";

/// Display names for the ids a log entry refers to.
pub trait NameResolver {
    fn exercise_name(&self, exercise_id: &str) -> Option<&str>;
    fn athlete_name(&self, athlete_id: &str) -> Option<&str>;
}

/// Stored volume when it is a real number, otherwise reps x weight.
pub fn effective_volume(entry: &LogEntry) -> f64 {
    match entry.volume {
        Some(volume) if volume.is_finite() => volume,
        _ => f64::from(entry.reps) * finite_or_zero(entry.weight),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub fn exercise_key(entry: &LogEntry, names: &impl NameResolver) -> String {
    let exercise_id = non_empty(entry.exercise_id.as_deref());
    exercise_id
        .and_then(|id| names.exercise_name(id))
        .or_else(|| non_empty(entry.exercise_name.as_deref()))
        .or(exercise_id)
        .unwrap_or(UNKNOWN_EXERCISE)
        .to_string()
}

pub fn athlete_key(entry: &LogEntry, names: &impl NameResolver) -> String {
    names
        .athlete_name(&entry.user_id)
        .unwrap_or(entry.user_id.as_str())
        .to_string()
}

/// Total volume per ISO week, ordered by (year, week).
pub fn weekly_volume<'a, I>(entries: I) -> Vec<WeeklyPoint>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut weeks: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for entry in entries {
        *weeks.entry(iso_week_key(entry.date)).or_default() += effective_volume(entry);
    }

    weeks
        .into_iter()
        .map(|(key, volume)| WeeklyPoint {
            week: format_week_label(key),
            volume,
        })
        .collect()
}

/// Volume per ISO week split into series. Every row carries every series
/// key, with 0 where that series logged nothing that week.
pub fn weekly_volume_grouped<'a, I>(
    entries: I,
    group_by: GroupBy,
    names: &impl NameResolver,
) -> GroupedWeeklyVolume
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut series_keys: Vec<String> = Vec::new();
    let mut weeks: BTreeMap<(i32, u32), HashMap<String, f64>> = BTreeMap::new();

    for entry in entries {
        let key = match group_by {
            GroupBy::Exercise => exercise_key(entry, names),
            GroupBy::User => athlete_key(entry, names),
            GroupBy::None => "volume".to_string(),
        };
        if !series_keys.contains(&key) {
            series_keys.push(key.clone());
        }
        *weeks
            .entry(iso_week_key(entry.date))
            .or_default()
            .entry(key)
            .or_default() += effective_volume(entry);
    }

    let rows = weeks
        .into_iter()
        .map(|(week, totals)| GroupedWeeklyRow {
            week: format_week_label(week),
            volumes: series_keys
                .iter()
                .map(|key| (key.clone(), totals.get(key).copied().unwrap_or(0.0)))
                .collect(),
        })
        .collect();

    GroupedWeeklyVolume { series_keys, rows }
}

/// Volume per calendar day, ascending. With `window > 1` each point also
/// carries the mean of the last `window` logged days (fewer at the start),
/// rounded to 2 places. Days without logs are skipped, not counted as 0.
pub fn daily_volume<'a, I>(entries: I, window: usize) -> Vec<DailyPoint>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for entry in entries {
        *days.entry(entry.date).or_default() += effective_volume(entry);
    }

    let volumes: Vec<f64> = days.values().copied().collect();
    days.into_iter()
        .enumerate()
        .map(|(i, (date, volume))| {
            let moving_average = (window > 1).then(|| {
                let from = (i + 1).saturating_sub(window);
                let trailing = &volumes[from..=i];
                round2(trailing.iter().sum::<f64>() / trailing.len() as f64)
            });
            DailyPoint {
                date: date_key(date),
                volume,
                moving_average,
            }
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn heavier(candidate: &LogEntry, current: &LogEntry) -> bool {
    let by_weight = finite_or_zero(candidate.weight).total_cmp(&finite_or_zero(current.weight));
    by_weight.then(candidate.reps.cmp(&current.reps)) == Ordering::Greater
}

/// Heaviest set per exercise, more reps breaking weight ties. Exercises
/// appear in the order they were first seen.
pub fn personal_records<'a, I>(entries: I, names: &impl NameResolver) -> Vec<PersonalRecord>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut best: Vec<(String, &LogEntry)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let key = exercise_key(entry, names);
        match positions.get(&key) {
            Some(&pos) => {
                if heavier(entry, best[pos].1) {
                    best[pos].1 = entry;
                }
            }
            None => {
                positions.insert(key.clone(), best.len());
                best.push((key, entry));
            }
        }
    }

    best.into_iter()
        .map(|(exercise, entry)| PersonalRecord {
            exercise,
            date: date_key(entry.date),
            reps: entry.reps,
            weight: finite_or_zero(entry.weight),
            volume: effective_volume(entry),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names;

    impl NameResolver for Names {
        fn exercise_name(&self, exercise_id: &str) -> Option<&str> {
            match exercise_id {
                "ex:bench-press" => Some("Bench Press"),
                "ex:floor-press" => Some("Floor Press"),
                _ => None,
            }
        }

        fn athlete_name(&self, athlete_id: &str) -> Option<&str> {
            (athlete_id == "u1").then_some("Athlete Adams")
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(date: NaiveDate, exercise_id: Option<&str>, reps: u32, weight: f64) -> LogEntry {
        LogEntry {
            id: format!("log-{date}-{reps}-{weight}"),
            user_id: "u1".into(),
            exercise_id: exercise_id.map(str::to_string),
            exercise_name: None,
            date,
            week: None,
            day_id: None,
            day_title: None,
            set_number: 1,
            reps,
            weight,
            rpe: None,
            volume: Some(f64::from(reps) * weight),
        }
    }

    #[test]
    fn effective_volume_prefers_stored_value() {
        let mut log = entry(day(2024, 1, 1), None, 5, 100.0);
        log.volume = Some(420.0);
        assert_eq!(effective_volume(&log), 420.0);
    }

    #[test]
    fn effective_volume_ignores_non_finite() {
        let mut log = entry(day(2024, 1, 1), None, 5, 100.0);
        log.volume = Some(f64::NAN);
        assert_eq!(effective_volume(&log), 500.0);
        log.volume = Some(f64::INFINITY);
        assert_eq!(effective_volume(&log), 500.0);
        log.volume = None;
        assert_eq!(effective_volume(&log), 500.0);
        log.weight = f64::NAN;
        assert_eq!(effective_volume(&log), 0.0);
    }

    #[test]
    fn exercise_key_fallbacks() {
        let mut log = entry(day(2024, 1, 1), Some("ex:bench-press"), 5, 100.0);
        assert_eq!(exercise_key(&log, &Names), "Bench Press");

        log.exercise_id = Some("ex:unlisted".into());
        log.exercise_name = Some("Landmine Press".into());
        assert_eq!(exercise_key(&log, &Names), "Landmine Press");

        log.exercise_name = None;
        assert_eq!(exercise_key(&log, &Names), "ex:unlisted");

        log.exercise_id = None;
        assert_eq!(exercise_key(&log, &Names), "Unknown");
    }

    #[test]
    fn weekly_totals_sum_to_input_volume() {
        let entries = vec![
            entry(day(2024, 12, 23), Some("ex:bench-press"), 6, 185.0),
            entry(day(2024, 12, 31), Some("ex:bench-press"), 5, 190.0),
            entry(day(2025, 1, 2), Some("ex:floor-press"), 5, 135.0),
            entry(day(2025, 3, 3), None, 8, 0.0),
            entry(day(2024, 12, 24), Some("ex:floor-press"), 4, 140.0),
        ];
        let weekly = weekly_volume(&entries);
        let total: f64 = weekly.iter().map(|point| point.volume).sum();
        let expected: f64 = entries.iter().map(effective_volume).sum();
        assert_eq!(total, expected);

        let labels: Vec<&str> = weekly.iter().map(|point| point.week.as_str()).collect();
        assert_eq!(labels, vec!["2024-W52", "2025-W01", "2025-W10"]);
        assert_eq!(weekly[0].volume, 6.0 * 185.0 + 4.0 * 140.0);
    }

    #[test]
    fn grouped_weekly_is_dense() {
        let entries = vec![
            entry(day(2024, 1, 1), Some("ex:bench-press"), 5, 100.0),
            entry(day(2024, 1, 9), Some("ex:floor-press"), 5, 80.0),
            entry(day(2024, 1, 10), Some("ex:bench-press"), 5, 105.0),
        ];
        let grouped = weekly_volume_grouped(&entries, GroupBy::Exercise, &Names);
        assert_eq!(grouped.series_keys, vec!["Bench Press", "Floor Press"]);
        assert_eq!(grouped.rows.len(), 2);
        assert_eq!(grouped.rows[0].week, "2024-W01");
        assert_eq!(grouped.rows[0].volumes["Bench Press"], 500.0);
        assert_eq!(grouped.rows[0].volumes["Floor Press"], 0.0);
        assert_eq!(grouped.rows[1].volumes["Bench Press"], 525.0);
        assert_eq!(grouped.rows[1].volumes["Floor Press"], 400.0);
    }

    #[test]
    fn grouped_by_user_falls_back_to_id() {
        let mut other = entry(day(2024, 1, 2), None, 3, 50.0);
        other.user_id = "u2".into();
        let entries = vec![entry(day(2024, 1, 1), None, 5, 100.0), other];
        let grouped = weekly_volume_grouped(&entries, GroupBy::User, &Names);
        assert_eq!(grouped.series_keys, vec!["Athlete Adams", "u2"]);
        assert_eq!(grouped.rows[0].volumes["u2"], 150.0);
    }

    #[test]
    fn daily_moving_average_uses_trailing_points() {
        let entries: Vec<LogEntry> = [10.0, 20.0, 30.0, 40.0]
            .iter()
            .enumerate()
            .map(|(i, volume)| entry(day(2024, 1, 1 + i as u32), None, 1, *volume))
            .collect();
        let daily = daily_volume(&entries, 3);
        let averages: Vec<Option<f64>> = daily.iter().map(|point| point.moving_average).collect();
        assert_eq!(averages, vec![Some(10.0), Some(15.0), Some(20.0), Some(30.0)]);
        assert_eq!(daily[0].date, "2024-01-01");
    }

    #[test]
    fn daily_sums_same_day_and_skips_gaps() {
        let entries = vec![
            entry(day(2024, 1, 5), None, 1, 10.0),
            entry(day(2024, 1, 1), None, 1, 5.0),
            entry(day(2024, 1, 5), None, 1, 20.0),
        ];
        let daily = daily_volume(&entries, 2);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[1].date, "2024-01-05");
        assert_eq!(daily[1].volume, 30.0);
        assert_eq!(daily[1].moving_average, Some(17.5));
    }

    #[test]
    fn daily_window_of_one_has_no_average() {
        let entries = vec![entry(day(2024, 1, 1), None, 3, 10.0)];
        assert!(daily_volume(&entries, 1)[0].moving_average.is_none());
        assert!(daily_volume(&entries, 0)[0].moving_average.is_none());
    }

    #[test]
    fn moving_average_rounds_to_cents() {
        let entries = vec![
            entry(day(2024, 1, 1), None, 1, 10.0),
            entry(day(2024, 1, 2), None, 1, 10.0),
            entry(day(2024, 1, 3), None, 1, 11.0),
        ];
        let daily = daily_volume(&entries, 3);
        assert_eq!(daily[2].moving_average, Some(10.33));
    }

    #[test]
    fn personal_record_breaks_weight_ties_on_reps() {
        let entries = vec![
            entry(day(2024, 1, 1), Some("ex:bench-press"), 5, 100.0),
            entry(day(2024, 1, 3), Some("ex:bench-press"), 8, 100.0),
            entry(day(2024, 1, 5), Some("ex:bench-press"), 10, 90.0),
        ];
        let records = personal_records(&entries, &Names);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exercise, "Bench Press");
        assert_eq!(records[0].weight, 100.0);
        assert_eq!(records[0].reps, 8);
        assert_eq!(records[0].date, "2024-01-03");
        assert_eq!(records[0].volume, 800.0);
    }

    #[test]
    fn personal_records_keep_first_seen_order() {
        let entries = vec![
            entry(day(2024, 1, 1), Some("ex:floor-press"), 5, 80.0),
            entry(day(2024, 1, 2), Some("ex:bench-press"), 5, 100.0),
            entry(day(2024, 1, 3), Some("ex:floor-press"), 3, 95.0),
        ];
        let records = personal_records(&entries, &Names);
        let order: Vec<&str> = records.iter().map(|r| r.exercise.as_str()).collect();
        assert_eq!(order, vec!["Floor Press", "Bench Press"]);
        assert_eq!(records[0].weight, 95.0);
    }
}
