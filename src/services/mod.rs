pub mod diagnostics;
pub mod monitor;
pub mod notify;
pub mod probe;
pub mod retry;
pub mod scheduler;
