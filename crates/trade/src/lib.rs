pub mod explore;
pub mod logger;
pub mod scheduler;
pub mod threshold;

pub use scheduler::{run_loop, LoopStats};
pub use threshold::{run_cycle, CycleOutcome, Decision, ThresholdParams};

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the library (loads environment variables from .env file)
/// This is automatically called when the library is loaded
fn init() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
    });
}

// Automatically initialize when the library is loaded
#[ctor::ctor]
fn setup() {
    init();
}
