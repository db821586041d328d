use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::rental_plans;

/// A (period, price) offer of a product. `period` is in months and unique per product,
/// `price` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = rental_plans)]
pub struct RentalPlanEntity {
    pub id: Uuid,
    pub period: i32,
    pub price: i32,
    pub product_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rental_plans)]
pub struct InsertRentalPlanEntity {
    pub period: i32,
    pub price: i32,
    pub product_id: Uuid,
}
