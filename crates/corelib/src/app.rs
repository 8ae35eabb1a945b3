mod window;
pub use window::*;

#[cfg(feature = "logs")]
pub mod logger;
#[cfg(feature = "logs")]
pub use logger::{LogConfig, init_logs};
