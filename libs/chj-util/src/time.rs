//! Timing of code blocks, for performance debugging.

/// Evaluate the code after the `;`, and if `$enabled` is true, print
/// the time it took to stderr.
#[macro_export]
macro_rules! time {
    ($enabled:expr, $name:expr; $($code:tt)*) => {{
        let enabled: bool = $enabled;
        let now = std::time::Instant::now();
        let r = {
            $($code)*
        };
        if enabled {
            let elapsed = now.elapsed();
            eprintln!("time {}: {elapsed:?} at {:?} line {}", $name, file!(), line!());
        }
        r
    }}
}

#[cfg(test)]
mod tests {
    #[test]
    fn t_time_returns_value() {
        let v = time!(false, "add"; 1 + 2);
        assert_eq!(v, 3);
        let v = time!(true, "mul"; 3 * 2);
        assert_eq!(v, 6);
    }
}
