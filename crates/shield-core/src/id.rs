//! Order identifiers

use crate::tier::Tier;
use chrono::Utc;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Generate an order id of the form `SS-<TIER>-<YYYYMMDDHHMMSS>-<8 hex>`
///
/// The suffix mixes the target with a random UUID, so two orders for the same
/// target created within the same second still get distinct ids.
pub fn generate_order_id(tier: Tier, target: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");

    let mut hasher = DefaultHasher::new();
    target.trim().to_ascii_lowercase().hash(&mut hasher);
    Uuid::new_v4().hash(&mut hasher);
    let suffix = hasher.finish() as u32;

    let tier_code: String = tier.as_str().chars().take(4).collect::<String>().to_ascii_uppercase();

    format!("SS-{}-{}-{:08x}", tier_code, timestamp, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_format() {
        let id = generate_order_id(Tier::Professional, "example.com");
        let parts: Vec<&str> = id.split('-').collect();

        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "SS");
        assert_eq!(parts[1], "PROF");
        assert_eq!(parts[2].len(), 14);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[3].len(), 8);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_second_same_target_does_not_collide() {
        let ids: std::collections::HashSet<String> = (0..200)
            .map(|_| generate_order_id(Tier::Basic, "example.com"))
            .collect();
        assert_eq!(ids.len(), 200);
    }
}
