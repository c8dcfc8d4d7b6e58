pub mod auth;
pub mod calendar;
pub mod order;
pub mod schedule;
pub mod user;
