pub mod abilities;
pub mod battle;
pub mod errors;
pub mod factory;
pub mod history;
pub mod log;
pub mod replay;
pub mod rng;
pub mod state;
pub mod utils;
