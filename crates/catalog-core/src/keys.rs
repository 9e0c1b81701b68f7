//! Store key layout.

/// Prefix of every persisted record key (`product:<id>`).
pub const PRODUCT_KEY_PREFIX: &str = "product:";

/// Set of every identifier written so far.
pub const ALL_IDS_KEY: &str = "products:all_ids";

/// Timestamp of the last completed sync.
pub const LAST_UPDATE_KEY: &str = "products:last_update";

/// Record count of the last completed sync, stored as a decimal string.
pub const COUNT_KEY: &str = "products:count";

/// Key of the record with the given identifier.
pub fn product_key(id: &str) -> String {
    format!("{PRODUCT_KEY_PREFIX}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_key() {
        assert_eq!(product_key("123"), "product:123");
        assert_eq!(product_key("product_7"), "product:product_7");
    }
}
