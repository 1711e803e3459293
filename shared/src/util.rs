/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Length of the short ticket id printed on kitchen tickets
pub const SHORT_ID_LEN: usize = 8;

/// Short form of an order id (first 8 characters)
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// New random order id (UUID v4)
pub fn new_order_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
