use crate::dates::days_between;
use crate::models::DayTemplate;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDay<'a> {
    pub index: usize,
    pub day: &'a DayTemplate,
}

/// Picks the day template that applies on `on_date` for a plan started on
/// `start_date`. The plan repeats with a period of `plan_days.len()` in both
/// directions, so dates before the start still land inside the cycle.
/// Returns `None` only for a plan without days.
pub fn resolve_day(
    plan_days: &[DayTemplate],
    start_date: NaiveDate,
    on_date: NaiveDate,
) -> Option<ResolvedDay<'_>> {
    let total = plan_days.len() as i64;
    if total == 0 {
        return None;
    }

    let elapsed = days_between(start_date, on_date);
    let index = elapsed.rem_euclid(total) as usize;
    plan_days.get(index).map(|day| ResolvedDay { index, day })
}
