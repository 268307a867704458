pub mod admin;
pub mod events;
pub mod stats;
pub mod views;
