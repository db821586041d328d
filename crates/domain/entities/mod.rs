pub mod products;
pub mod rental_plans;
pub mod subscriptions;
