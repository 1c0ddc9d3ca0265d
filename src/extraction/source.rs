//! Raw input bytes from a file or standard input

use std::io::Read;
use std::path::Path;

use crate::errors::{RecoveryError, RecoveryResult};

/// Where backup bytes are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(String),
}

impl InputSource {
    /// `-` selects standard input, anything else is a path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(arg.to_string())
        }
    }

    pub fn describe(&self) -> &str {
        match self {
            InputSource::Stdin => "<stdin>",
            InputSource::File(path) => path,
        }
    }

    /// Whether the source can be read at all (stdin always can)
    pub fn exists(&self) -> bool {
        match self {
            InputSource::Stdin => true,
            InputSource::File(path) => Path::new(path).exists(),
        }
    }

    /// Read the whole source into memory
    pub fn read_all(&self) -> RecoveryResult<Vec<u8>> {
        let map_err = |source: std::io::Error| RecoveryError::Input {
            path: self.describe().to_string(),
            source,
        };
        match self {
            InputSource::Stdin => {
                let mut buffer = Vec::new();
                std::io::stdin()
                    .lock()
                    .read_to_end(&mut buffer)
                    .map_err(map_err)?;
                Ok(buffer)
            }
            InputSource::File(path) => std::fs::read(path).map_err(map_err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_arg() {
        assert_eq!(InputSource::from_arg("-"), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg("backup.txt"),
            InputSource::File("backup.txt".to_string())
        );
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let source = InputSource::File("/definitely/not/here.txt".to_string());
        assert!(!source.exists());
        let err = source.read_all().unwrap_err();
        assert!(matches!(err, RecoveryError::Input { .. }));
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }
}
