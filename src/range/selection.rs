//! Per-view range selection state.
//!
//! The data view and the comparison view each own one `RangeSelection`; both
//! go through the same `resolver` functions, so the two views can never drift
//! apart in how they interpret a period.

use chrono::{Duration, NaiveDate};

use crate::domain::{DateBounds, DateInterval, PeriodToken, ResolvedRange};
use crate::error::RangeError;
use crate::range::resolver::{refine, resolve};

/// Which end of the refinement control to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelection {
    anchor: NaiveDate,
    period: PeriodToken,
    /// Narrowed sub-interval; `None` means "the whole resolved interval".
    refinement: Option<DateInterval>,
}

impl RangeSelection {
    /// Anchor on the first configured date, one week long.
    pub fn new(bounds: &DateBounds) -> Self {
        Self {
            anchor: bounds.min,
            period: PeriodToken::Week,
            refinement: None,
        }
    }

    pub fn with_period(mut self, period: PeriodToken) -> Self {
        self.period = period;
        self
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn period(&self) -> PeriodToken {
        self.period
    }

    pub fn resolved(&self, bounds: &DateBounds) -> ResolvedRange {
        resolve(self.anchor, self.period, bounds)
    }

    /// Final interval: the refinement if it still fits, else the resolved interval.
    pub fn interval(&self, bounds: &DateBounds) -> DateInterval {
        let resolved = self.resolved(bounds).interval;
        match self.refinement {
            Some(r) => refine(resolved, Some(r.start), Some(r.end)).unwrap_or(resolved),
            None => resolved,
        }
    }

    /// Move the anchor, keeping it inside the bounds. Drops any refinement.
    pub fn set_anchor(&mut self, date: NaiveDate, bounds: &DateBounds) {
        self.anchor = bounds.clamp(date);
        self.refinement = None;
    }

    pub fn shift_anchor(&mut self, days: i64, bounds: &DateBounds) {
        let moved = self
            .anchor
            .checked_add_signed(Duration::days(days))
            .unwrap_or(if days < 0 { bounds.min } else { bounds.max });
        self.set_anchor(moved, bounds);
    }

    /// Change the period. Drops any refinement.
    pub fn set_period(&mut self, period: PeriodToken) {
        self.period = period;
        self.refinement = None;
    }

    /// Replace the refinement after validating it against the resolved interval.
    pub fn set_refinement(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        bounds: &DateBounds,
    ) -> Result<DateInterval, RangeError> {
        let resolved = self.resolved(bounds).interval;
        let refined = refine(resolved, start, end)?;
        self.refinement = (refined != resolved).then_some(refined);
        Ok(refined)
    }

    /// Move one handle by `days`, stopping at the resolved ends and at the other handle.
    pub fn nudge(&mut self, handle: Handle, days: i64, bounds: &DateBounds) -> DateInterval {
        let resolved = self.resolved(bounds).interval;
        let current = self.interval(bounds);
        let step = |date: NaiveDate| date.checked_add_signed(Duration::days(days)).unwrap_or(date);

        let next = match handle {
            Handle::Start => DateInterval {
                start: step(current.start).clamp(resolved.start, current.end),
                end: current.end,
            },
            Handle::End => DateInterval {
                start: current.start,
                end: step(current.end).clamp(current.start, resolved.end),
            },
        };
        self.refinement = (next != resolved).then_some(next);
        next
    }

    pub fn is_refined(&self) -> bool {
        self.refinement.is_some()
    }
}
