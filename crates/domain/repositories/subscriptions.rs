use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;
use crate::domain::value_objects::subscriptions::{
    ListSubscriptionsFilter, SubscriptionDetails, SubscriptionExtension,
};

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    /// Subscription with its product and the product's rental plans.
    async fn find_details_by_id(&self, subscription_id: Uuid)
    -> Result<Option<SubscriptionDetails>>;

    async fn list_details(&self, filter: ListSubscriptionsFilter)
    -> Result<Vec<SubscriptionDetails>>;

    async fn count(&self) -> Result<i64>;

    /// Writes the extension only if the row still matches the expected snapshot and is
    /// ACTIVE. Returns `None` when nothing matched.
    async fn apply_extension(
        &self,
        extension: SubscriptionExtension,
    ) -> Result<Option<SubscriptionEntity>>;
}
