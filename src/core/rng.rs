use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Value handed out once a recorded draw sequence runs dry.
pub const EXHAUSTED_DRAW: f64 = 0.5;

/// Reproducible unit-interval source for `resolve_next_action`.
pub fn seeded(seed: u64) -> impl FnMut() -> f64 {
    let mut rng = StdRng::seed_from_u64(seed);
    move || rng.gen::<f64>()
}

pub fn from_entropy() -> impl FnMut() -> f64 {
    let mut rng = StdRng::from_entropy();
    move || rng.gen::<f64>()
}

/// Feeds back previously recorded draws in order.
pub fn recorded(draws: &[f64]) -> impl FnMut() -> f64 + '_ {
    let mut idx = 0;
    move || {
        let v = draws.get(idx).copied().unwrap_or(EXHAUSTED_DRAW);
        idx += 1;
        v
    }
}

/// Always returns the same draw. Handy for pinning outcomes in tests.
pub fn constant(value: f64) -> impl FnMut() -> f64 {
    move || value
}
