//! Logging macros
//!
//! - Firmware (`servo2040`): forwards to defmt over RTT
//! - Host tests: prints to stdout
//! - Anything else: arguments are type-checked and dropped
//!
//! Stick to `{}` and `{:?}` placeholders so the same call site works for both
//! defmt and `core::fmt`.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "servo2040")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "servo2040"), test))]
        println!("[INFO] {}", format!($($arg)*));

        #[cfg(all(not(feature = "servo2040"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "servo2040")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "servo2040"), test))]
        println!("[WARN] {}", format!($($arg)*));

        #[cfg(all(not(feature = "servo2040"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "servo2040")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "servo2040"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));

        #[cfg(all(not(feature = "servo2040"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "servo2040")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "servo2040"), test))]
        println!("[DEBUG] {}", format!($($arg)*));

        #[cfg(all(not(feature = "servo2040"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}
