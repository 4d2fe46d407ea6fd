//! # LTC Trading
//!
//! A liquid time-constant reservoir model over monthly per-company
//! financial data, with a policy-gradient-trained linear readout.
//!
//! ## Modules
//!
//! - `model` - the continuous-time cell, linear readout and Adam optimizer
//! - `agent` - epsilon-greedy exploration and the reward signal
//! - `training` - configuration and the epoch-driven training loop
//! - `data` - record table types, CSV ingestion and standardization

pub mod agent;
pub mod data;
pub mod error;
pub mod model;
pub mod training;

pub use agent::{reward, EpsilonGreedyPolicy};
pub use data::{load_records, normalize_records, synthetic_records, FinancialRecord};
pub use error::EngineError;
pub use model::{AdamOptimizer, DenseLayer, LtcCell};
pub use training::{softmax, EpochReport, Trainer, TrainerConfig};
