/// Similar to `info!` macro in tracing, which it forwards to.
/// You can pass in the starting time and it will also log how long it took from starting time to now.
/// ```ignore
/// info_time!("str {}, {}", 1, 2);
/// let time = Local::now();
/// info_time!(time, "str {}, {}", 1, 2);
/// ```
#[macro_export]
macro_rules! info_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        ::tracing::info!("{}", format!($strfm, $($arg),*));
    }};
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {{
        let run_time = $crate::macros::elapsed_secs($time);
        ::tracing::info!(run_time, "{}", format!($strfm, $($arg),*));
    }};
}

/// `warn!` counterpart of [`info_time!`], used for dates that are skipped on error.
/// Takes the same optional starting time.
#[macro_export]
macro_rules! warn_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        ::tracing::warn!("{}", format!($strfm, $($arg),*));
    }};
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {{
        let run_time = $crate::macros::elapsed_secs($time);
        ::tracing::warn!(run_time, "{}", format!($strfm, $($arg),*));
    }};
}

/// Seconds from `start` to now, as used by the `*_time!` macros.
#[doc(hidden)]
pub fn elapsed_secs(start: ::chrono::DateTime<::chrono::Local>) -> f64 {
    (::chrono::Local::now() - start)
        .num_microseconds()
        .map(|n| n as f64 / 1_000_000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};

    #[test]
    fn elapsed_is_measured_from_start() {
        let start = Local::now() - Duration::seconds(2);
        let secs = super::elapsed_secs(start);
        assert!((2.0..3.0).contains(&secs), "{secs}");
    }

    #[test]
    fn both_arms_expand() {
        let start = Local::now();
        crate::warn_time!("plain {}", 1);
        crate::warn_time!(start, "timed {} {}", 1, 2);
        crate::info_time!(start, "timed");
    }
}
