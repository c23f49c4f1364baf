//! Cluster inventory sync: polls namespaces and services, publishes a
//! snapshot into redis, and answers live listing requests.

pub mod services;
pub mod signals;

pub use services::{Services, redis_store};
pub use signals::spawn_signal_listener;
