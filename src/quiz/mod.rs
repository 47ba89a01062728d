pub mod action;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod q_table;
pub mod reward;
pub mod store;
pub mod types;

pub use config::QuizConfig;
pub use engine::QuizEngine;
pub use error::QuizError;
pub use types::*;
