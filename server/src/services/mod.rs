pub mod reaper;
pub mod session;
