//! Built-in subscribers shipped with the crate (demo/reference).

mod log;

pub use log::LogReceiver;
