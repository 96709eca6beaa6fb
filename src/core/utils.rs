use crate::core::state::StatRecord;

pub const MIN_HP: i32 = 10;

/// Multiplies damage and rounds half away from zero.
pub fn scale_damage(damage: i32, multiplier: f64) -> i32 {
    (damage as f64 * multiplier).round() as i32
}

pub fn initial_hp(stats: &StatRecord) -> i32 {
    stats
        .strength()
        .saturating_mul(10)
        .saturating_add(stats.intelligence().saturating_mul(2))
        .max(MIN_HP)
}

/// Draws an integer in `0..=max` from a unit-interval sample.
pub fn roll_inclusive(sample: f64, max: i32) -> i32 {
    if max <= 0 {
        return 0;
    }
    let span = max as f64 + 1.0;
    ((sample.clamp(0.0, 1.0) * span).floor() as i32).min(max)
}

/// Round of the `combat_index`-th combat action (markers excluded), starting at 1.
pub fn round_for(combat_index: u32) -> u32 {
    combat_index / 2 + 1
}

pub fn percent_of(value: i32, max: i32) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    value as f64 / max as f64
}
