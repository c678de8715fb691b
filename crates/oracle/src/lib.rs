pub mod collector;
pub mod record;

pub use collector::{poll_once, run_monitor, MonitorParams};
pub use record::{ArbRecord, RecordLog};
