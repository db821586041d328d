use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::{
    products::ProductEntity, rental_plans::RentalPlanEntity, subscriptions::SubscriptionEntity,
};
use crate::domain::value_objects::enums::sort_order::SubscriptionSortKey;

/// A subscription loaded together with its product and the product's rental plans.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionDetails {
    pub subscription: SubscriptionEntity,
    pub product: ProductEntity,
    pub rental_plans: Vec<RentalPlanEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSubscriptionsFilter {
    pub sort_key: SubscriptionSortKey,
    pub limit: i64,
    pub offset: i64,
}

/// Field set written by an extension. The `expected_*` values are the snapshot the
/// extension was validated against; the write only lands if the row still matches them.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionExtension {
    pub subscription_id: Uuid,
    pub expected_rental_period: i32,
    pub expected_active_until: DateTime<Utc>,
    pub rental_period: i32,
    pub monthly_price: i32,
    pub active_until: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RentalPlanDto {
    pub id: Uuid,
    pub period: i32,
    pub price: i32,
    pub product_id: Uuid,
}

impl From<RentalPlanEntity> for RentalPlanDto {
    fn from(value: RentalPlanEntity) -> Self {
        Self {
            id: value.id,
            period: value.period,
            price: value.price,
            product_id: value.product_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub core_attribute: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub rental_plans: Vec<RentalPlanDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDto {
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
    pub product: ProductDto,
}

impl From<SubscriptionDetails> for SubscriptionDto {
    fn from(value: SubscriptionDetails) -> Self {
        let SubscriptionDetails {
            subscription,
            product,
            mut rental_plans,
        } = value;
        rental_plans.sort_by_key(|plan| plan.period);

        Self {
            id: subscription.id,
            reference_id: subscription.reference_id,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
            activated_at: subscription.activated_at,
            active_until: subscription.active_until,
            terminated_at: subscription.terminated_at,
            termination_reason: subscription.termination_reason,
            termination_comment: subscription.termination_comment,
            rental_period: subscription.rental_period,
            monthly_price: subscription.monthly_price,
            state: subscription.state,
            product_id: subscription.product_id,
            product: ProductDto {
                id: product.id,
                slug: product.slug,
                title: product.title,
                core_attribute: product.core_attribute,
                image: product.image,
                created_at: product.created_at,
                rental_plans: rental_plans.into_iter().map(RentalPlanDto::from).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionEnvelope {
    pub subscription: SubscriptionDto,
}

/// PATCH body. The period is kept as raw JSON so a malformed value can be reported as
/// a validation error instead of a body parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendSubscriptionRequest {
    #[serde(default, alias = "newRentalPeriodMonths")]
    pub new_rental_period: Option<Value>,
}

impl ExtendSubscriptionRequest {
    /// Numeric interpretation of the requested period. Numbers and numeric strings are
    /// accepted; everything else becomes NaN and fails the finiteness check downstream.
    pub fn requested_period(&self) -> f64 {
        match self.new_rental_period.as_ref() {
            Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(raw)) => raw.trim().parse::<f64>().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn details() -> SubscriptionDetails {
        let product_id = Uuid::new_v4();
        let created_at = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
        SubscriptionDetails {
            subscription: SubscriptionEntity {
                id: Uuid::new_v4(),
                reference_id: "G-PHONE-3M".to_string(),
                created_at,
                updated_at: created_at,
                activated_at: Some(created_at),
                active_until: Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(),
                terminated_at: None,
                termination_reason: None,
                termination_comment: None,
                rental_period: 3,
                monthly_price: 5499,
                state: "ACTIVE".to_string(),
                product_id,
            },
            product: ProductEntity {
                id: product_id,
                slug: "phone-max".to_string(),
                title: "Phone Max".to_string(),
                core_attribute: "6.7\" OLED".to_string(),
                image: "/products/phone-max.png".to_string(),
                created_at,
            },
            rental_plans: [6, 1, 3]
                .into_iter()
                .map(|period| RentalPlanEntity {
                    id: Uuid::new_v4(),
                    period,
                    price: period * 1000,
                    product_id,
                })
                .collect(),
        }
    }

    #[test]
    fn dto_serializes_camel_case_with_sorted_plans() {
        let dto = SubscriptionDto::from(details());
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["referenceId"], "G-PHONE-3M");
        assert_eq!(json["rentalPeriod"], 3);
        assert_eq!(json["activeUntil"], "2025-01-15T00:00:00Z");
        assert_eq!(json["terminatedAt"], Value::Null);
        assert_eq!(json["product"]["coreAttribute"], "6.7\" OLED");

        let periods: Vec<i64> = json["product"]["rentalPlans"]
            .as_array()
            .unwrap()
            .iter()
            .map(|plan| plan["period"].as_i64().unwrap())
            .collect();
        assert_eq!(periods, vec![1, 3, 6]);
    }

    #[test]
    fn requested_period_accepts_numbers_and_numeric_strings() {
        let request: ExtendSubscriptionRequest =
            serde_json::from_value(json!({ "newRentalPeriod": 6 })).unwrap();
        assert_eq!(request.requested_period(), 6.0);

        let request: ExtendSubscriptionRequest =
            serde_json::from_value(json!({ "newRentalPeriod": " 12 " })).unwrap();
        assert_eq!(request.requested_period(), 12.0);

        let request: ExtendSubscriptionRequest =
            serde_json::from_value(json!({ "newRentalPeriodMonths": 6 })).unwrap();
        assert_eq!(request.requested_period(), 6.0);
    }

    #[test]
    fn requested_period_is_nan_for_anything_else() {
        for body in [
            json!({}),
            json!({ "newRentalPeriod": null }),
            json!({ "newRentalPeriod": true }),
            json!({ "newRentalPeriod": "six" }),
            json!({ "newRentalPeriod": [6] }),
        ] {
            let request: ExtendSubscriptionRequest = serde_json::from_value(body).unwrap();
            assert!(request.requested_period().is_nan());
        }

        let request: ExtendSubscriptionRequest =
            serde_json::from_value(json!({ "newRentalPeriod": "inf" })).unwrap();
        assert!(!request.requested_period().is_finite());
    }
}
