/// Ordering applied to the subscription listing. Both keys sort ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionSortKey {
    #[default]
    ActiveUntil,
    ProductTitle,
}

impl SubscriptionSortKey {
    /// Lenient parse for query strings; unknown keys fall back to the default.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("productTitle") | Some("product.title") => SubscriptionSortKey::ProductTitle,
            _ => SubscriptionSortKey::ActiveUntil,
        }
    }
}
