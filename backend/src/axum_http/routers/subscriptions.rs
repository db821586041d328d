use crate::{
    axum_http::{
        error_responses::AppError,
        extractors::{JsonBody, Query},
    },
    usecases::subscriptions::SubscriptionUseCase,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::{
            enums::sort_order::SubscriptionSortKey,
            pagination::PageRequest,
            subscriptions::{ExtendSubscriptionRequest, SubscriptionEnvelope},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::subscriptions::SubscriptionPostgres,
    },
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Raw query values; parsed leniently so bad values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListSubscriptionsQuery {
    page: Option<String>,
    limit: Option<String>,
    sort: Option<String>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscriptions_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let subscriptions_usecase = SubscriptionUseCase::new(Arc::new(subscriptions_repository));

    router(Arc::new(subscriptions_usecase))
}

/// Router over any repository implementation; `routes` wires the Postgres one.
pub fn router<T>(subscriptions_usecase: Arc<SubscriptionUseCase<T>>) -> Router
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            get(list_subscriptions::<T>).fallback(collection_method_not_allowed),
        )
        .route(
            "/:subscription_id",
            get(get_subscription::<T>)
                .patch(extend_subscription::<T>)
                .fallback(item_method_not_allowed),
        )
        .with_state(subscriptions_usecase)
}

pub async fn list_subscriptions<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Query(query): Query<ListSubscriptionsQuery>,
) -> Result<impl IntoResponse, AppError>
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let page = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref());
    let sort_key = SubscriptionSortKey::from_query(query.sort.as_deref());

    let page = subscriptions_usecase
        .list_subscriptions(page, sort_key)
        .await?;

    Ok(Json(page))
}

pub async fn get_subscription<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription_id = parse_subscription_id(&raw_id)?;
    let subscription = subscriptions_usecase
        .get_subscription(subscription_id)
        .await?;

    Ok(Json(SubscriptionEnvelope { subscription }))
}

pub async fn extend_subscription<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Path(raw_id): Path<String>,
    JsonBody(request): JsonBody<ExtendSubscriptionRequest>,
) -> Result<impl IntoResponse, AppError>
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription_id = parse_subscription_id(&raw_id)?;
    info!(%subscription_id, "subscriptions: extend request received");

    let subscription = subscriptions_usecase
        .extend_subscription(subscription_id, request.requested_period())
        .await?;

    Ok(Json(SubscriptionEnvelope { subscription }))
}

async fn collection_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed { allow: "GET" }
}

async fn item_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed { allow: "GET, PATCH" }
}

fn parse_subscription_id(raw_id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw_id.trim())
        .map_err(|_| AppError::BadRequest("Invalid subscription id".to_string()))
}
