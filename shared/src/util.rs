/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// 新商家 ID (时间戳派生的字符串，同一毫秒内复制多次也不会冲突)
pub fn new_store_id() -> String {
    snowflake_id().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_ids_are_numeric_and_distinct() {
        let a = new_store_id();
        let b = new_store_id();
        assert!(a.chars().all(|c| c.is_ascii_digit()));
        // 同一毫秒内仅随机位不同，极小概率相同
        let ids: std::collections::HashSet<String> = (0..64).map(|_| new_store_id()).collect();
        assert!(ids.len() > 60);
        assert!(!a.is_empty() && !b.is_empty());
    }
}
