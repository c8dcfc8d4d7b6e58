pub mod booking;
pub mod calendar;
pub mod clock;
pub mod events;
pub mod metrics;
pub mod orders;
pub mod refresh;
pub mod schedule;
pub mod screen;
pub mod time_slots;
