use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::enums::subscription_states::SubscriptionState;
use crate::infra::db::postgres::schema::subscriptions;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub reference_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub active_until: DateTime<Utc>,
    pub terminated_at: Option<DateTime<Utc>>,
    pub termination_reason: Option<String>,
    pub termination_comment: Option<String>,
    pub rental_period: i32,
    pub monthly_price: i32,
    pub state: String,
    pub product_id: Uuid,
}

impl SubscriptionEntity {
    /// Unknown values stored in `state` are surfaced as `None` rather than guessed.
    pub fn lifecycle_state(&self) -> Option<SubscriptionState> {
        SubscriptionState::from_str(&self.state)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub reference_id: String,
    pub activated_at: Option<DateTime<Utc>>,
    pub active_until: DateTime<Utc>,
    pub terminated_at: Option<DateTime<Utc>>,
    pub termination_reason: Option<String>,
    pub termination_comment: Option<String>,
    pub rental_period: i32,
    pub monthly_price: i32,
    pub state: String,
    pub product_id: Uuid,
}
