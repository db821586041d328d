use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*, update};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{products, rental_plans, subscriptions},
    },
};
use domain::{
    entities::{
        products::ProductEntity, rental_plans::RentalPlanEntity,
        subscriptions::SubscriptionEntity,
    },
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::{sort_order::SubscriptionSortKey, subscription_states::SubscriptionState},
        subscriptions::{ListSubscriptionsFilter, SubscriptionDetails, SubscriptionExtension},
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_details_by_id(
        &self,
        subscription_id: Uuid,
    ) -> Result<Option<SubscriptionDetails>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = subscriptions::table
            .inner_join(products::table)
            .filter(subscriptions::id.eq(subscription_id))
            .select((SubscriptionEntity::as_select(), ProductEntity::as_select()))
            .first::<(SubscriptionEntity, ProductEntity)>(&mut conn)
            .optional()?;

        let Some((subscription, product)) = row else {
            return Ok(None);
        };

        let plans = rental_plans::table
            .filter(rental_plans::product_id.eq(product.id))
            .order(rental_plans::period.asc())
            .select(RentalPlanEntity::as_select())
            .load::<RentalPlanEntity>(&mut conn)?;

        Ok(Some(SubscriptionDetails {
            subscription,
            product,
            rental_plans: plans,
        }))
    }

    async fn list_details(
        &self,
        filter: ListSubscriptionsFilter,
    ) -> Result<Vec<SubscriptionDetails>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = subscriptions::table
            .inner_join(products::table)
            .select((SubscriptionEntity::as_select(), ProductEntity::as_select()))
            .into_boxed();

        // Subscription id breaks ties so page boundaries are stable.
        query = match filter.sort_key {
            SubscriptionSortKey::ActiveUntil => {
                query.order((subscriptions::active_until.asc(), subscriptions::id.asc()))
            }
            SubscriptionSortKey::ProductTitle => {
                query.order((products::title.asc(), subscriptions::id.asc()))
            }
        };

        let rows = query
            .limit(filter.limit)
            .offset(filter.offset)
            .load::<(SubscriptionEntity, ProductEntity)>(&mut conn)?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut product_ids: Vec<Uuid> = rows.iter().map(|(_, product)| product.id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();

        let plans = rental_plans::table
            .filter(rental_plans::product_id.eq_any(product_ids))
            .order((rental_plans::product_id.asc(), rental_plans::period.asc()))
            .select(RentalPlanEntity::as_select())
            .load::<RentalPlanEntity>(&mut conn)?;

        Ok(attach_rental_plans(rows, plans))
    }

    async fn count(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = subscriptions::table
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total)
    }

    async fn apply_extension(
        &self,
        extension: SubscriptionExtension,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(subscriptions::table)
            .filter(subscriptions::id.eq(extension.subscription_id))
            .filter(subscriptions::state.eq(SubscriptionState::Active.as_str()))
            .filter(subscriptions::rental_period.eq(extension.expected_rental_period))
            .filter(subscriptions::active_until.eq(extension.expected_active_until))
            .set((
                subscriptions::rental_period.eq(extension.rental_period),
                subscriptions::monthly_price.eq(extension.monthly_price),
                subscriptions::active_until.eq(extension.active_until),
                subscriptions::updated_at.eq(extension.updated_at),
            ))
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(updated)
    }
}

/// Distributes plans onto their products, keeping the row order of `rows`.
fn attach_rental_plans(
    rows: Vec<(SubscriptionEntity, ProductEntity)>,
    plans: Vec<RentalPlanEntity>,
) -> Vec<SubscriptionDetails> {
    let mut plans_by_product: HashMap<Uuid, Vec<RentalPlanEntity>> = HashMap::new();
    for plan in plans {
        plans_by_product
            .entry(plan.product_id)
            .or_default()
            .push(plan);
    }

    rows.into_iter()
        .map(|(subscription, product)| SubscriptionDetails {
            rental_plans: plans_by_product
                .get(&product.id)
                .cloned()
                .unwrap_or_default(),
            subscription,
            product,
        })
        .collect()
}
