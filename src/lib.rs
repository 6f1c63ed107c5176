//! weekfit - AI-generated weekly workout plan
//!
//! A cached plan, a completion ledger, per-exercise swaps and a workout
//! stopwatch, all driven through one [`Session`].

pub mod ai;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod links;
pub mod nav;
pub mod plan;
pub mod session;
pub mod stopwatch;
pub mod tui;

pub use db::Database;
pub use session::Session;
