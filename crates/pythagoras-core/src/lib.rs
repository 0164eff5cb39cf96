pub mod api;
pub mod quiz;
pub mod ranking;
pub mod time;
