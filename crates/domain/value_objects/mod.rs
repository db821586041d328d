pub mod enums;
pub mod pagination;
pub mod subscriptions;
