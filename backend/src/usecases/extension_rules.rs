//! Eligibility rules for lengthening a subscription's rental period.
//!
//! Every rule is a pure function of an [`ExtensionContext`]. The guards in
//! [`EXTENSION_GUARDS`] run first, in order, and [`require_matching_plan`] runs last and
//! yields the plan the subscription moves to. The first failure decides the rejection.

use anyhow::{Context, Result};
use chrono::{DateTime, Months, Utc};
use crates::domain::{
    entities::{rental_plans::RentalPlanEntity, subscriptions::SubscriptionEntity},
    value_objects::{
        enums::subscription_states::SubscriptionState, subscriptions::SubscriptionExtension,
    },
};

pub struct ExtensionContext<'a> {
    pub subscription: &'a SubscriptionEntity,
    pub rental_plans: &'a [RentalPlanEntity],
    /// Already known to be finite.
    pub requested_period: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionRejection {
    NotActive,
    PeriodNotGreater { current: i32 },
    PlanNotFound { requested: f64 },
}

pub type ExtensionGuard = fn(&ExtensionContext<'_>) -> Result<(), ExtensionRejection>;

pub const EXTENSION_GUARDS: [ExtensionGuard; 2] = [require_active, require_longer_period];

pub fn require_active(ctx: &ExtensionContext<'_>) -> Result<(), ExtensionRejection> {
    match ctx.subscription.lifecycle_state() {
        Some(SubscriptionState::Active) => Ok(()),
        _ => Err(ExtensionRejection::NotActive),
    }
}

pub fn require_longer_period(ctx: &ExtensionContext<'_>) -> Result<(), ExtensionRejection> {
    let current = ctx.subscription.rental_period;
    if ctx.requested_period > f64::from(current) {
        Ok(())
    } else {
        Err(ExtensionRejection::PeriodNotGreater { current })
    }
}

/// Exact match on the plan period; a fractional request never matches.
pub fn require_matching_plan<'a>(
    ctx: &ExtensionContext<'a>,
) -> Result<&'a RentalPlanEntity, ExtensionRejection> {
    ctx.rental_plans
        .iter()
        .find(|plan| f64::from(plan.period) == ctx.requested_period)
        .ok_or(ExtensionRejection::PlanNotFound {
            requested: ctx.requested_period,
        })
}

/// Runs the guards, then resolves the plan the subscription will move to.
pub fn evaluate<'a>(ctx: &ExtensionContext<'a>) -> Result<&'a RentalPlanEntity, ExtensionRejection> {
    for guard in EXTENSION_GUARDS {
        guard(ctx)?;
    }
    require_matching_plan(ctx)
}

/// The new expiry is the current `active_until` plus the full length of the new plan,
/// in calendar months (day clamped to the end of shorter months).
pub fn plan_extension(
    subscription: &SubscriptionEntity,
    plan: &RentalPlanEntity,
    now: DateTime<Utc>,
) -> Result<SubscriptionExtension> {
    let months = u32::try_from(plan.period)
        .with_context(|| format!("rental plan {} has a negative period", plan.id))?;
    let active_until = subscription
        .active_until
        .checked_add_months(Months::new(months))
        .context("failed to compute extended active_until")?;

    Ok(SubscriptionExtension {
        subscription_id: subscription.id,
        expected_rental_period: subscription.rental_period,
        expected_active_until: subscription.active_until,
        rental_period: plan.period,
        monthly_price: plan.price,
        active_until,
        updated_at: now,
    })
}
