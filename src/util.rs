use std::time::{SystemTime, UNIX_EPOCH};

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Epoch-day index: whole days since the Unix epoch, not aligned to any timezone.
pub fn day_identifier(unix_millis: i64) -> i64 {
    unix_millis.div_euclid(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_identifier_boundaries() {
        assert_eq!(day_identifier(0), 0);
        assert_eq!(day_identifier(MILLIS_PER_DAY - 1), 0);
        assert_eq!(day_identifier(MILLIS_PER_DAY), 1);
        assert_eq!(day_identifier(19_000 * MILLIS_PER_DAY + 5), 19_000);
    }
}
