//! Shared "query pipeline" used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! range selection -> resolve/clamp -> refine -> project -> advisories
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::app::context::AppContext;
use crate::domain::{Advisory, DateInterval, ResolvedRange};
use crate::fields::FieldSpec;
use crate::project::{ProjectionOutcome, SeriesProjector};
use crate::range::RangeSelection;

/// One or two series to project.
#[derive(Debug, Clone, Copy)]
pub enum FieldSelection<'a> {
    Single(&'a FieldSpec),
    Compare(&'a FieldSpec, &'a FieldSpec),
}

/// All computed outputs of a single range query.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub resolved: ResolvedRange,
    /// Final interval after refinement.
    pub interval: DateInterval,
    pub outcome: ProjectionOutcome,
    /// Everything the user should be told, in display order.
    pub advisories: Vec<Advisory>,
}

/// Resolve the selection and project the requested fields.
pub fn run_query(ctx: &AppContext, selection: &RangeSelection, fields: FieldSelection<'_>) -> QueryOutput {
    let resolved = selection.resolved(&ctx.bounds);
    let interval = selection.interval(&ctx.bounds);

    let projector = SeriesProjector::new(&ctx.dataset);
    let outcome = match fields {
        FieldSelection::Single(field) => projector.single(field, interval),
        FieldSelection::Compare(first, second) => projector.compare(first, second, interval),
    };

    let mut advisories = Vec::new();
    if resolved.clamped {
        advisories.push(Advisory::ClampedToMaximum { max: ctx.bounds.max });
    }
    advisories.extend(outcome.advisories());

    QueryOutput {
        resolved,
        interval,
        outcome,
        advisories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_dataset;
    use crate::domain::{DateBounds, PeriodToken, ViewMode};
    use crate::fields::FieldRegistry;
    use crate::models::PredictionModels;
    use chrono::NaiveDate;

    fn ctx() -> AppContext {
        let bounds = DateBounds::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap();
        let models = PredictionModels::default();
        let dataset = generate_dataset(&bounds, &models, 5).unwrap();
        AppContext::new(bounds, dataset, FieldRegistry::default(), models).unwrap()
    }

    #[test]
    fn clamped_query_reports_the_maximum() {
        let ctx = ctx();
        let mut selection = RangeSelection::new(&ctx.bounds).with_period(PeriodToken::Month);
        selection.set_anchor(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(), &ctx.bounds);
        let diesel = ctx.registry.resolve_for(ViewMode::Single, "diesel").unwrap();

        let out = run_query(&ctx, &selection, FieldSelection::Single(diesel));
        assert!(out.resolved.clamped);
        assert_eq!(out.interval.end, ctx.bounds.max);
        assert_eq!(out.advisories, vec![Advisory::ClampedToMaximum { max: ctx.bounds.max }]);
        assert!(!out.outcome.projection().unwrap().is_empty());
    }

    #[test]
    fn last_day_anchor_asks_to_widen() {
        let ctx = ctx();
        let mut selection = RangeSelection::new(&ctx.bounds);
        selection.set_anchor(ctx.bounds.max, &ctx.bounds);
        let diesel = ctx.registry.resolve_for(ViewMode::Single, "diesel").unwrap();

        let out = run_query(&ctx, &selection, FieldSelection::Single(diesel));
        assert_eq!(out.outcome, ProjectionOutcome::WidenRange);
        assert_eq!(
            out.advisories,
            vec![Advisory::ClampedToMaximum { max: ctx.bounds.max }, Advisory::WidenRange]
        );
    }
}
