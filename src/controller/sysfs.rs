use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Failure talking to a kernel control file
#[derive(Debug, Error)]
pub enum SysfsError {
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("unparsable content in {path:?}: {content:?}")]
    Parse { path: PathBuf, content: String },
}

/// Replace the content of a control file with the textual form of `value`
pub fn write_value<T: Display>(path: &Path, value: T) -> Result<(), SysfsError> {
    fs::write(path, value.to_string()).map_err(|source| SysfsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse the first whitespace-separated token of a control file
pub fn read_value<T: FromStr>(path: &Path) -> Result<T, SysfsError> {
    let content = fs::read_to_string(path).map_err(|source| SysfsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    content
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| SysfsError::Parse {
            path: path.to_path_buf(),
            content,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("avc_volume");
        fs::write(&path, "123456\n").unwrap();

        write_value(&path, 7).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "7");
    }

    #[test]
    fn test_read_trims_kernel_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("headset_type");
        fs::write(&path, "2\n").unwrap();

        assert_eq!(read_value::<i32>(&path).unwrap(), 2);
    }

    #[test]
    fn test_read_reports_missing_and_garbage() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(read_value::<i32>(&missing), Err(SysfsError::Read { .. })));

        let garbage = dir.path().join("garbage");
        fs::write(&garbage, "on\n").unwrap();
        assert!(matches!(read_value::<i32>(&garbage), Err(SysfsError::Parse { .. })));
    }

    #[test]
    fn test_write_into_directory_fails() {
        let dir = TempDir::new().unwrap();
        let err = write_value(dir.path(), 1).unwrap_err();
        assert!(matches!(err, SysfsError::Write { .. }));
    }
}
