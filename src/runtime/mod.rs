/// One-shot prompt runtime - Gateway

mod oneshot;

pub use oneshot::{pick_model, run_oneshot, OneShotRequest, OneShotResult};
