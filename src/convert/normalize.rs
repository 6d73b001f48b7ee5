//! Output normalization
//!
//! The converter does not end its output with a newline; downstream tools
//! that concatenate or line-process the artifacts need one.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, ScatterError};

pub const TERMINATOR: u8 = b'\n';

/// Make sure `path` ends with [`TERMINATOR`].
///
/// Appends one byte unless the file already ends with it, so normalizing a
/// file twice leaves it unchanged. Returns whether a byte was appended. The
/// file must exist: a converter that reported success without writing its
/// output is a write failure.
pub fn normalize(path: &Path) -> Result<bool> {
    let write_failed = |source| ScatterError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .map_err(write_failed)?;

    let len = file.metadata().map_err(write_failed)?.len();
    if len > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).map_err(write_failed)?;
        file.read_exact(&mut last).map_err(write_failed)?;
        if last[0] == TERMINATOR {
            return Ok(false);
        }
    }

    file.write_all(&[TERMINATOR]).map_err(write_failed)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_appends_missing_terminator() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo.v");
        fs::write(&path, "module foo;\nendmodule").unwrap();

        assert!(normalize(&path)?);
        assert_eq!(fs::read_to_string(&path).unwrap(), "module foo;\nendmodule\n");
        Ok(())
    }

    #[test]
    fn test_repeated_normalization_is_a_no_op() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo.v");
        fs::write(&path, "endmodule").unwrap();

        assert!(normalize(&path)?);
        assert!(!normalize(&path)?);
        assert_eq!(fs::read(&path).unwrap(), b"endmodule\n");
        Ok(())
    }

    #[test]
    fn test_empty_file_gets_terminator() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.v");
        fs::write(&path, "").unwrap();

        assert!(normalize(&path)?);
        assert_eq!(fs::read(&path).unwrap(), b"\n");
        Ok(())
    }

    #[test]
    fn test_missing_output_is_write_failure() {
        let temp_dir = TempDir::new().unwrap();
        let err = normalize(&temp_dir.path().join("never_written.v")).unwrap_err();
        assert!(matches!(err, ScatterError::OutputWriteFailed { .. }));
    }
}
