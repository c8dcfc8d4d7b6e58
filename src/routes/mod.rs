pub mod booking;
pub mod health;
pub mod metrics;
pub mod schedule;
pub mod websocket;
