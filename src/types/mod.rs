// ABOUTME: Domain newtypes shared across the crate.
// ABOUTME: Exports ServiceName used for process-manager and unit naming.

mod service_name;

pub use service_name::{ServiceName, ServiceNameError};
