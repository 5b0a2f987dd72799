pub mod checker;
pub mod state;

pub use checker::CheckOutcome;
pub use state::{MonitorState, SharedMonitorState, SiteStatus, StatsSnapshot, Transition};
