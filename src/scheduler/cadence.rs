//! When the scheduler fires.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use thiserror::Error;

/// The cron expression could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cron expression '{expr}': {reason}")]
pub struct CronError {
    pub expr: String,
    pub reason: String,
}

/// Fire schedule.
#[derive(Debug, Clone)]
pub enum Cadence {
    /// Cron expression, seconds field first.
    Cron(Box<Schedule>),
    /// Fixed period between fires.
    Every(Duration),
}

impl Cadence {
    /// Parse a cron expression.
    ///
    /// Accepts six or seven fields (seconds first) and the classic five-field
    /// form, which fires at second zero. `?` is treated as `*`.
    pub fn cron(expr: &str) -> Result<Self, CronError> {
        let normalized = normalize(expr);
        Schedule::from_str(&normalized)
            .map(|schedule| Cadence::Cron(Box::new(schedule)))
            .map_err(|e| CronError {
                expr: expr.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn every(period: Duration) -> Self {
        Cadence::Every(period)
    }

    /// Delay from `now` until the next fire, or `None` if the schedule has
    /// no future occurrence.
    pub fn next_delay(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Cadence::Every(period) => Some(*period),
            Cadence::Cron(schedule) => {
                let next = schedule.after(&now).next()?;
                Some((next - now).to_std().unwrap_or(Duration::ZERO))
            }
        }
    }
}

fn normalize(expr: &str) -> String {
    let fields: Vec<&str> = expr
        .split_whitespace()
        .map(|field| if field == "?" { "*" } else { field })
        .collect();
    if fields.len() == 5 {
        format!("0 {}", fields.join(" "))
    } else {
        fields.join(" ")
    }
}
