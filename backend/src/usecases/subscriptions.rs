use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use crates::domain::{
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::sort_order::SubscriptionSortKey,
        pagination::{PageDto, PageRequest},
        subscriptions::{ListSubscriptionsFilter, SubscriptionDetails, SubscriptionDto},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::extension_rules::{self, ExtensionContext, ExtensionRejection};

/// Snapshot writes that lose a race are re-validated against fresh state this many times.
const MAX_EXTENSION_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Subscription not found")]
    NotFound,
    #[error("Only active subscriptions can be extended")]
    InvalidState,
    #[error("No rental plan found for the requested period ({})", display_period(.requested))]
    PlanNotFound { requested: f64 },
    #[error("Subscription was modified concurrently, please retry")]
    Conflict,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::InvalidArgument(_)
            | SubscriptionError::InvalidState
            | SubscriptionError::PlanNotFound { .. } => StatusCode::BAD_REQUEST,
            SubscriptionError::NotFound => StatusCode::NOT_FOUND,
            SubscriptionError::Conflict => StatusCode::CONFLICT,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExtensionRejection> for SubscriptionError {
    fn from(value: ExtensionRejection) -> Self {
        match value {
            ExtensionRejection::NotActive => SubscriptionError::InvalidState,
            ExtensionRejection::PeriodNotGreater { current } => {
                SubscriptionError::InvalidArgument(format!(
                    "New rental period must be greater than current rental period ({current})"
                ))
            }
            ExtensionRejection::PlanNotFound { requested } => {
                SubscriptionError::PlanNotFound { requested }
            }
        }
    }
}

/// Whole numbers print as integers; very large or very small magnitudes switch to
/// exponent form so a client-supplied value cannot blow up the message.
fn display_period(period: &f64) -> String {
    let period = *period;
    let magnitude = period.abs();
    if period.fract() == 0.0 && magnitude < 1e15 {
        format!("{}", period as i64)
    } else if magnitude >= 1e15 || magnitude < 1e-6 {
        format!("{period:e}")
    } else {
        format!("{period}")
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> SubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    pub async fn list_subscriptions(
        &self,
        page: PageRequest,
        sort_key: SubscriptionSortKey,
    ) -> UseCaseResult<PageDto<SubscriptionDto>> {
        info!(
            page = page.page,
            limit = page.limit,
            ?sort_key,
            "subscriptions: listing page"
        );
        let filter = ListSubscriptionsFilter {
            sort_key,
            limit: page.limit,
            offset: page.offset(),
        };

        let (items, total) = tokio::try_join!(
            self.subscription_repo.list_details(filter),
            self.subscription_repo.count()
        )
        .map_err(|err| {
            error!(db_error = ?err, "subscriptions: failed to list subscriptions");
            SubscriptionError::Internal(err)
        })?;

        Ok(PageDto::new(
            items.into_iter().map(SubscriptionDto::from).collect(),
            page,
            total,
        ))
    }

    pub async fn get_subscription(&self, subscription_id: Uuid) -> UseCaseResult<SubscriptionDto> {
        let details = self.load_details(subscription_id).await?;
        Ok(SubscriptionDto::from(details))
    }

    /// Moves an ACTIVE subscription onto a longer rental plan and pushes its expiry out by
    /// the new plan's length. Nothing is written when any check fails.
    pub async fn extend_subscription(
        &self,
        subscription_id: Uuid,
        requested_period: f64,
    ) -> UseCaseResult<SubscriptionDto> {
        info!(
            %subscription_id,
            requested_period,
            "subscriptions: extension requested"
        );

        if !requested_period.is_finite() {
            warn!(%subscription_id, "subscriptions: non-numeric rental period");
            return Err(SubscriptionError::InvalidArgument(
                "newRentalPeriod must be a number".to_string(),
            ));
        }

        for attempt in 1..=MAX_EXTENSION_ATTEMPTS {
            let details = self.load_details(subscription_id).await?;

            let ctx = ExtensionContext {
                subscription: &details.subscription,
                rental_plans: &details.rental_plans,
                requested_period,
            };
            let plan = extension_rules::evaluate(&ctx).map_err(|rejection| {
                warn!(
                    %subscription_id,
                    requested_period,
                    current_period = details.subscription.rental_period,
                    state = %details.subscription.state,
                    ?rejection,
                    "subscriptions: extension rejected"
                );
                SubscriptionError::from(rejection)
            })?;

            let extension =
                extension_rules::plan_extension(&details.subscription, plan, Utc::now())?;
            let new_active_until = extension.active_until;

            let updated = self
                .subscription_repo
                .apply_extension(extension)
                .await
                .map_err(|err| {
                    error!(
                        %subscription_id,
                        db_error = ?err,
                        "subscriptions: failed to apply extension"
                    );
                    SubscriptionError::Internal(err)
                })?;

            match updated {
                Some(subscription) => {
                    info!(
                        %subscription_id,
                        rental_period = subscription.rental_period,
                        active_until = %new_active_until,
                        "subscriptions: extension applied"
                    );
                    return Ok(SubscriptionDto::from(SubscriptionDetails {
                        subscription,
                        product: details.product,
                        rental_plans: details.rental_plans,
                    }));
                }
                None => {
                    warn!(
                        %subscription_id,
                        attempt,
                        "subscriptions: subscription changed while extending, re-validating"
                    );
                }
            }
        }

        Err(SubscriptionError::Conflict)
    }

    async fn load_details(&self, subscription_id: Uuid) -> UseCaseResult<SubscriptionDetails> {
        self.subscription_repo
            .find_details_by_id(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to load subscription"
                );
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                info!(%subscription_id, "subscriptions: subscription not found");
                SubscriptionError::NotFound
            })
    }
}
