use std::{path::Path, fs::read_to_string};

use anyhow::{Result, anyhow, Context};


pub fn my_read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    read_to_string(&path).with_context(
        || anyhow!("opening path for reading: {:?}", path.as_ref()))
}

pub fn my_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    std::fs::write(&path, content).with_context(
        || anyhow!("writing to path: {:?}", path.as_ref()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_read_missing() {
        let e = my_read_to_string("/nonexistent/tablehtml/file").unwrap_err();
        assert!(e.to_string().contains("/nonexistent/tablehtml/file"));
    }
}
