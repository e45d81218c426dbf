use crate::errors::AppError;
use crate::models::{AppData, Athlete, Exercise, LogEntry, LogPatch, NewLogEntry, PlanTemplate};
use crate::reports::NameResolver;
use chrono::NaiveDate;
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Log query; every bound is optional and date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub user_id: Option<String>,
    pub exercise_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl LogFilter {
    fn matches(&self, entry: &LogEntry) -> bool {
        self.user_id.as_ref().is_none_or(|id| *id == entry.user_id)
            && self
                .exercise_id
                .as_ref()
                .is_none_or(|id| entry.exercise_id.as_ref() == Some(id))
            && self.from.is_none_or(|from| entry.date >= from)
            && self.to.is_none_or(|to| entry.date <= to)
    }
}

impl AppData {
    pub fn athlete(&self, id: &str) -> Option<&Athlete> {
        self.athletes.iter().find(|athlete| athlete.id == id)
    }

    pub fn athlete_mut(&mut self, id: &str) -> Option<&mut Athlete> {
        self.athletes.iter_mut().find(|athlete| athlete.id == id)
    }

    pub fn plan(&self, id: &str) -> Option<&PlanTemplate> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|exercise| exercise.id == id)
    }

    /// Matching entries ordered by date; equal dates keep insertion order.
    pub fn query_logs(&self, filter: &LogFilter) -> Vec<&LogEntry> {
        let mut logs: Vec<&LogEntry> = self.logs.iter().filter(|e| filter.matches(e)).collect();
        logs.sort_by_key(|entry| entry.date);
        logs
    }

    /// Validates and stores a new set. Volume defaults to reps x weight
    /// unless the caller supplied one.
    pub fn create_log(&mut self, new: NewLogEntry, today: NaiveDate) -> Result<LogEntry, AppError> {
        let user_id = new.user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(AppError::bad_request("user_id required"));
        }
        if self.athlete(&user_id).is_none() {
            return Err(AppError::bad_request(format!("user_id not found: {user_id}")));
        }

        let exercise_id = self.known_exercise_id(new.exercise_id)?;
        let reps = new.reps.unwrap_or(0);
        let weight = clean_weight(new.weight.unwrap_or(0.0));
        let volume = new.volume.unwrap_or(f64::from(reps) * weight);

        let entry = LogEntry {
            id: self.next_log_id(),
            user_id,
            exercise_id,
            exercise_name: new.exercise_name.filter(|name| !name.trim().is_empty()),
            date: new.date.unwrap_or(today),
            week: new.week,
            day_id: new.day_id,
            day_title: new.day_title,
            set_number: new.set_number.unwrap_or(1),
            reps,
            weight,
            rpe: new.rpe,
            volume: Some(volume),
        };
        self.logs.push(entry.clone());
        Ok(entry)
    }

    pub fn log(&self, id: &str) -> Option<&LogEntry> {
        self.logs.iter().find(|entry| entry.id == id)
    }

    /// Applies `patch` to a stored set. When reps or weight change without
    /// an explicit volume, volume is recomputed as reps x weight.
    pub fn update_log(&mut self, id: &str, patch: LogPatch) -> Result<LogEntry, AppError> {
        let exercise_id = match patch.exercise_id {
            Some(raw) => Some(self.known_exercise_id(Some(raw))?),
            None => None,
        };
        let entry = self
            .logs
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| AppError::not_found("log not found"))?;

        if let Some(exercise_id) = exercise_id {
            entry.exercise_id = exercise_id;
        }
        if let Some(name) = patch.exercise_name {
            entry.exercise_name = Some(name).filter(|name| !name.trim().is_empty());
        }
        if let Some(date) = patch.date {
            entry.date = date;
        }
        if patch.week.is_some() {
            entry.week = patch.week;
        }
        if patch.day_id.is_some() {
            entry.day_id = patch.day_id;
        }
        if patch.day_title.is_some() {
            entry.day_title = patch.day_title;
        }
        if let Some(set_number) = patch.set_number {
            entry.set_number = set_number;
        }
        if patch.rpe.is_some() {
            entry.rpe = patch.rpe;
        }

        let load_changed = patch.reps.is_some() || patch.weight.is_some();
        if let Some(reps) = patch.reps {
            entry.reps = reps;
        }
        if let Some(weight) = patch.weight {
            entry.weight = clean_weight(weight);
        }
        match patch.volume {
            Some(volume) => entry.volume = Some(volume),
            None if load_changed => entry.volume = Some(f64::from(entry.reps) * entry.weight),
            None => {}
        }

        Ok(entry.clone())
    }

    /// Removes a set, returning it with its former position.
    pub fn delete_log(&mut self, id: &str) -> Option<(usize, LogEntry)> {
        let pos = self.logs.iter().position(|entry| entry.id == id)?;
        Some((pos, self.logs.remove(pos)))
    }

    /// Trimmed id, `None` when blank, or an error when it names no exercise.
    fn known_exercise_id(&self, raw: Option<String>) -> Result<Option<String>, AppError> {
        let id = raw.map(|id| id.trim().to_string()).filter(|id| !id.is_empty());
        if let Some(id) = &id {
            if self.exercise(id).is_none() {
                return Err(AppError::bad_request(format!("exercise_id not found: {id}")));
            }
        }
        Ok(id)
    }

    fn next_log_id(&self) -> String {
        let mut n = self.logs.len() + 1;
        loop {
            let id = format!("log-{n}");
            if !self.logs.iter().any(|entry| entry.id == id) {
                return id;
            }
            n += 1;
        }
    }
}

fn clean_weight(weight: f64) -> f64 {
    if weight.is_finite() { weight.max(0.0) } else { 0.0 }
}

impl NameResolver for AppData {
    fn exercise_name(&self, exercise_id: &str) -> Option<&str> {
        self.exercise(exercise_id).map(|exercise| exercise.name.as_str())
    }

    fn athlete_name(&self, athlete_id: &str) -> Option<&str> {
        self.athlete(athlete_id)
            .map(|athlete| athlete.name.as_str())
            .filter(|name| !name.is_empty())
    }
}
