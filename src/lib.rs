pub mod config;
pub mod dispatch;
pub mod errors;
pub mod pipeline;
pub mod stage;
