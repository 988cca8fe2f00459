//! Reward policy
//!
//! Pure mapping from a rarity judgment to eco points. Two input shapes are
//! supported: the canonical integer tier (1..=5) and the legacy category
//! labels still produced by older classifier prompts. Both map to the same
//! point scale; anything unrecognized earns the very-common default.

use tracing::warn;

/// Points for the lowest ("very common") tier, also the safe default
pub const DEFAULT_POINTS: i64 = 10;

/// Map a rarity tier to eco points
pub fn points_for_rarity(rarity: i64) -> i64 {
    match rarity {
        1 => 10,
        2 => 25,
        3 => 50,
        4 => 100,
        5 => 200,
        other => {
            warn!("Unrecognized rarity tier {}, using default points", other);
            DEFAULT_POINTS
        }
    }
}

/// Map a legacy rarity label to eco points (case-insensitive, trimmed)
pub fn points_for_label(label: &str) -> i64 {
    match label.trim().to_lowercase().as_str() {
        "common" => 10,
        "uncommon" => 25,
        "rare" => 50,
        "very rare" => 100,
        "extremely rare" => 200,
        other => {
            warn!("Unrecognized rarity label {:?}, using default points", other);
            DEFAULT_POINTS
        }
    }
}
