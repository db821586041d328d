//! Runs against a migrated database: `DATABASE_URL=... cargo test -- --ignored`.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use crates::{
    domain::{
        entities::{
            products::InsertProductEntity, rental_plans::InsertRentalPlanEntity,
            subscriptions::InsertSubscriptionEntity,
        },
        repositories::subscriptions::SubscriptionRepository,
        value_objects::{
            enums::sort_order::SubscriptionSortKey,
            subscriptions::{ListSubscriptionsFilter, SubscriptionExtension},
        },
    },
    infra::db::{
        postgres::{
            postgres_connection::{self, PgPoolSquad, PoolOptions},
            schema::{products, rental_plans, subscriptions},
        },
        repositories::subscriptions::SubscriptionPostgres,
    },
};
use diesel::{PgConnection, insert_into, prelude::*};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Tests share the tables, so row counts are only stable while one runs at a time.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

fn pool() -> Arc<PgPoolSquad> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    Arc::new(postgres_connection::establish_connection(&url, &PoolOptions::default()).unwrap())
}

fn seed_product(conn: &mut PgConnection, title: &str, plans: &[(i32, i32)]) -> Uuid {
    let tag = Uuid::new_v4().simple().to_string();

    let product_id = insert_into(products::table)
        .values(InsertProductEntity {
            slug: format!("it-{}-{tag}", title.to_lowercase().replace(' ', "-")),
            title: title.to_string(),
            core_attribute: "6.1\" OLED".to_string(),
            image: "/products/it.png".to_string(),
        })
        .returning(products::id)
        .get_result::<Uuid>(conn)
        .unwrap();

    let plans: Vec<_> = plans
        .iter()
        .map(|&(period, price)| InsertRentalPlanEntity {
            period,
            price,
            product_id,
        })
        .collect();
    insert_into(rental_plans::table)
        .values(&plans)
        .execute(conn)
        .unwrap();

    product_id
}

fn seed_subscription(
    conn: &mut PgConnection,
    product_id: Uuid,
    active_until: DateTime<Utc>,
    rental_period: i32,
    monthly_price: i32,
) -> Uuid {
    insert_into(subscriptions::table)
        .values(InsertSubscriptionEntity {
            reference_id: format!("IT-{}", Uuid::new_v4().simple()),
            activated_at: Some(Utc.with_ymd_and_hms(2024, 10, 15, 0, 0, 0).unwrap()),
            active_until,
            terminated_at: None,
            termination_reason: None,
            termination_comment: None,
            rental_period,
            monthly_price,
            state: "ACTIVE".to_string(),
            product_id,
        })
        .returning(subscriptions::id)
        .get_result::<Uuid>(conn)
        .unwrap()
}

/// Inserts a product with 1/3/6 month plans and an ACTIVE 3 month subscription.
fn seed(pool: &PgPoolSquad) -> (Uuid, Uuid) {
    let mut conn = pool.get().unwrap();
    let product_id = seed_product(
        &mut conn,
        "Integration Phone",
        &[(1, 1000), (3, 2500), (6, 4500)],
    );
    let subscription_id = seed_subscription(
        &mut conn,
        product_id,
        Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(),
        3,
        2500,
    );

    (product_id, subscription_id)
}

fn cleanup(pool: &PgPoolSquad, product_id: Uuid) {
    let mut conn = pool.get().unwrap();
    diesel::delete(products::table.filter(products::id.eq(product_id)))
        .execute(&mut conn)
        .unwrap();
}

#[tokio::test]
#[ignore = "requires a migrated Postgres database"]
async fn extension_only_lands_on_matching_snapshot() {
    let _guard = DB_LOCK.lock().await;
    let pool = pool();
    let (product_id, subscription_id) = seed(&pool);
    let repo = SubscriptionPostgres::new(Arc::clone(&pool));

    let details = repo
        .find_details_by_id(subscription_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(details.product.id, product_id);
    let periods: Vec<i32> = details.rental_plans.iter().map(|p| p.period).collect();
    assert_eq!(periods, vec![1, 3, 6]);

    let extension = SubscriptionExtension {
        subscription_id,
        expected_rental_period: 3,
        expected_active_until: details.subscription.active_until,
        rental_period: 6,
        monthly_price: 4500,
        active_until: Utc.with_ymd_and_hms(2025, 7, 15, 0, 0, 0).unwrap(),
        updated_at: Utc::now(),
    };

    let updated = repo.apply_extension(extension.clone()).await.unwrap().unwrap();
    assert_eq!(updated.rental_period, 6);
    assert_eq!(updated.monthly_price, 4500);
    assert_eq!(updated.active_until, extension.active_until);

    // Same snapshot again: the row has moved on, so nothing matches.
    let stale = repo.apply_extension(extension).await.unwrap();
    assert!(stale.is_none());

    cleanup(&pool, product_id);
}

#[tokio::test]
#[ignore = "requires a migrated Postgres database"]
async fn missing_subscription_is_none() {
    let repo = SubscriptionPostgres::new(pool());

    assert!(repo.find_details_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a migrated Postgres database"]
async fn listing_orders_by_expiry_then_id_and_pages_with_plans() {
    let _guard = DB_LOCK.lock().await;
    let pool = pool();
    let repo = SubscriptionPostgres::new(Arc::clone(&pool));
    let before = repo.count().await.unwrap();

    // Dates well before any realistic data so these rows lead the listing.
    let first_expiry = Utc.with_ymd_and_hms(1971, 1, 1, 0, 0, 0).unwrap();
    let shared_expiry = Utc.with_ymd_and_hms(1971, 2, 1, 0, 0, 0).unwrap();
    let (product_id, earliest, mut tied) = {
        let mut conn = pool.get().unwrap();
        // Inserted out of order to check the plans come back sorted.
        let product_id = seed_product(
            &mut conn,
            "Integration Camera",
            &[(6, 4500), (1, 1000), (3, 2500)],
        );
        let earliest = seed_subscription(&mut conn, product_id, first_expiry, 1, 1000);
        let tied = vec![
            seed_subscription(&mut conn, product_id, shared_expiry, 3, 2500),
            seed_subscription(&mut conn, product_id, shared_expiry, 3, 2500),
        ];
        (product_id, earliest, tied)
    };
    tied.sort();

    let page = |offset: i64| ListSubscriptionsFilter {
        sort_key: SubscriptionSortKey::ActiveUntil,
        limit: 1,
        offset,
    };

    let first = repo.list_details(page(0)).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].subscription.id, earliest);
    assert_eq!(first[0].product.id, product_id);
    let periods: Vec<i32> = first[0].rental_plans.iter().map(|p| p.period).collect();
    assert_eq!(periods, vec![1, 3, 6]);

    let second = repo.list_details(page(1)).await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].subscription.id, tied[0]);

    let third = repo.list_details(page(2)).await.unwrap();
    assert_eq!(third[0].subscription.id, tied[1]);

    assert_eq!(repo.count().await.unwrap(), before + 3);

    cleanup(&pool, product_id);
}
