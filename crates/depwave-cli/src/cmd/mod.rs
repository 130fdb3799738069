pub mod critical_path;
pub mod discover;
pub mod health;
pub mod order;
pub mod readiness;
pub mod sequence;
