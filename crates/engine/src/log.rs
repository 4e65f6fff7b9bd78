//! Console logging for the engine
//!
//! Lines are prefixed with the component in brackets (`[Resolver]`,
//! `[Driver]`). Chatter goes through [`engine_log!`](crate::engine_log) and
//! only prints when the config enables it; problems always go to stderr via
//! [`warn`].

/// Verbose log line, printed only when `$enabled` is true
#[macro_export]
macro_rules! engine_log {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            eprintln!($($arg)*);
        }
    };
}

/// Always-on warning line
pub fn warn(component: &str, message: impl std::fmt::Display) {
    eprintln!("[{}] warning: {}", component, message);
}
