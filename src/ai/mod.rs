pub mod eval;
pub mod simple;

pub use eval::evaluate_battle;
pub use simple::{choose_action, choose_tactical, run_auto_battle};
