use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Lifecycle of a rental subscription: `Draft -> Fulfilling -> Active -> Terminated`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionState {
    Draft,
    Fulfilling,
    Active,
    Terminated,
}

impl SubscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Draft => "DRAFT",
            SubscriptionState::Fulfilling => "FULFILLING",
            SubscriptionState::Active => "ACTIVE",
            SubscriptionState::Terminated => "TERMINATED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(SubscriptionState::Draft),
            "FULFILLING" => Some(SubscriptionState::Fulfilling),
            "ACTIVE" => Some(SubscriptionState::Active),
            "TERMINATED" => Some(SubscriptionState::Terminated),
            _ => None,
        }
    }
}

impl Display for SubscriptionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
