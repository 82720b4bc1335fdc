//! Printing diagnostics to stderr.

/// Print a warning, tagged with the source location, to stderr.
#[macro_export]
macro_rules! warn {
    ($formatstr:expr $(,$arg:expr)*) => { {
        use std::io::Write;
        let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
        let _ = write!(&mut outp, "W: ");
        let _ = write!(&mut outp, $formatstr $(,$arg)*);
        let _ = writeln!(&mut outp, " at {:?} line {}", file!(), line!());
        let _ = outp.flush();
    } }
}

/// Like `warn!` but with a "D: " tag, and only if `$enabled` is
/// true. Meant to be used with a flag read via
/// `env::get_env_bool`.
#[macro_export]
macro_rules! debug_if {
    ($enabled:expr, $formatstr:expr $(,$arg:expr)*) => { {
        if $enabled {
            use std::io::Write;
            let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
            let _ = write!(&mut outp, "D: ");
            let _ = write!(&mut outp, $formatstr $(,$arg)*);
            let _ = writeln!(&mut outp, " at {:?} line {}", file!(), line!());
            let _ = outp.flush();
        }
    } }
}
