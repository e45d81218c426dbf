use crate::dates::days_between;
use crate::models::{Athlete, Compliance, PlanTemplate};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Why compliance has no value for an athlete. Distinct from 0%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uncomputable {
    NoPlanAssigned,
    NoStartDate,
    PlanHasNoDays,
    PlanHasNoWeeks,
}

impl fmt::Display for Uncomputable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Uncomputable::NoPlanAssigned => "no plan assigned",
            Uncomputable::NoStartDate => "plan start date not set",
            Uncomputable::PlanHasNoDays => "plan has no days",
            Uncomputable::PlanHasNoWeeks => "plan has no weeks",
        };
        f.write_str(reason)
    }
}

/// Appends `date` to the athlete's completed days. Duplicates are kept;
/// [`compute_compliance`] counts distinct days.
pub fn mark_complete(athlete: &mut Athlete, date: NaiveDate) {
    athlete.completed_dates.push(date);
    debug!(athlete = %athlete.id, %date, "day marked complete");
}

pub fn compute_compliance(
    athlete: &Athlete,
    plan: Option<&PlanTemplate>,
    today: NaiveDate,
) -> Result<Compliance, Uncomputable> {
    let plan = plan.ok_or(Uncomputable::NoPlanAssigned)?;
    let start = athlete.plan_start_date.ok_or(Uncomputable::NoStartDate)?;
    if plan.days.is_empty() {
        return Err(Uncomputable::PlanHasNoDays);
    }
    if plan.weeks == 0 {
        return Err(Uncomputable::PlanHasNoWeeks);
    }

    let elapsed_inclusive = days_between(start, today) + 1;
    let max_possible = plan.days.len() as i64 * i64::from(plan.weeks.max(1));
    let expected = elapsed_inclusive.clamp(0, max_possible) as u32;

    // Not capped at the plan's nominal end; only `expected` is.
    let completed = athlete
        .completed_dates
        .iter()
        .filter(|date| start <= **date && **date <= today)
        .collect::<BTreeSet<_>>()
        .len() as u32;

    let pct = if expected > 0 {
        (100.0 * f64::from(completed) / f64::from(expected))
            .round()
            .clamp(0.0, 100.0) as u32
    } else {
        0
    };

    Ok(Compliance {
        expected,
        completed,
        pct,
    })
}
