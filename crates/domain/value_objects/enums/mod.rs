pub mod sort_order;
pub mod subscription_states;
