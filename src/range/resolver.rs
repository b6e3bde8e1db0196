//! Turn an anchor date and a period token into a concrete, clamped interval.
//!
//! The resolver is pure apart from one informational log line when it clamps.
//! Front-ends call it once per view with their own `RangeSelection` state.

use chrono::{Days, Months, NaiveDate};
use tracing::{debug, info};

use crate::domain::{DateBounds, DateInterval, PeriodToken, ResolvedRange};
use crate::error::RangeError;

/// End date before clamping.
///
/// Month arithmetic keeps the day of month when the target month has it and
/// falls back to the target month's last day otherwise. `None` means the
/// calendar overflowed, which callers treat as "past the maximum".
pub fn naive_end(anchor: NaiveDate, token: PeriodToken, bounds: &DateBounds) -> Option<NaiveDate> {
    match token {
        PeriodToken::Week => anchor.checked_add_days(Days::new(7)),
        PeriodToken::Month => anchor.checked_add_months(Months::new(1)),
        PeriodToken::Quarter => anchor.checked_add_months(Months::new(3)),
        PeriodToken::Year => anchor.checked_add_months(Months::new(12)),
        PeriodToken::FiveYears => anchor.checked_add_months(Months::new(60)),
        PeriodToken::Maximum => Some(bounds.max),
    }
}

/// Resolve `anchor + token` into an interval that never passes `bounds.max`.
///
/// The lower bound is not re-checked here; the input layer keeps anchors at or
/// after `bounds.min`. An anchor past `bounds.max` is pulled back to it.
pub fn resolve(anchor: NaiveDate, token: PeriodToken, bounds: &DateBounds) -> ResolvedRange {
    let anchor_past_max = anchor > bounds.max;
    if anchor_past_max {
        debug!(%anchor, max = %bounds.max, "anchor after configured maximum");
    }
    let start = anchor.min(bounds.max);

    // `maximum` resolves to `bounds.max` itself, so it never trips the clamp.
    let (end, end_clamped) = match naive_end(start, token, bounds) {
        Some(end) if end <= bounds.max => (end, false),
        _ => (bounds.max, true),
    };

    if end_clamped {
        info!(max = %bounds.max, "series ends at {}", bounds.max);
    }

    ResolvedRange {
        interval: DateInterval { start, end },
        clamped: anchor_past_max || end_clamped,
    }
}

/// Narrow a resolved interval to a user-chosen sub-interval.
///
/// Missing ends default to the resolved ends. `start == end` is accepted; the
/// projector reports it as a degenerate range.
pub fn refine(
    resolved: DateInterval,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateInterval, RangeError> {
    let start = start.unwrap_or(resolved.start);
    let end = end.unwrap_or(resolved.end);

    for date in [start, end] {
        if !resolved.contains(date) {
            return Err(RangeError::OutsideResolved {
                date,
                start: resolved.start,
                end: resolved.end,
            });
        }
    }
    if start > end {
        return Err(RangeError::Inverted { start, end });
    }

    Ok(DateInterval { start, end })
}
