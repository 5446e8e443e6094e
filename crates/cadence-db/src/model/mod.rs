pub mod attendance;
pub mod facility;
pub mod schedule;
