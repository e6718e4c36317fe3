//! This module provides observability and diagnostics for the compress and
//! uncompress paths.
//!
//! The `log_metric!` macro is the primary tool. It is compiled out of release
//! builds via `#[cfg(debug_assertions)]`.

/// Logs a structured key-value metric line at `debug` level, only in debug builds.
///
/// # Example
/// ```
/// use cloudpack::log_metric;
/// let n = 4;
/// log_metric!("event"="compress", "method"="huffman", "n"=&n);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            $crate::__log::debug!(target: "cloudpack::metrics", "CLOUDPACK_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}
