pub mod extension_rules;
pub mod subscriptions;
