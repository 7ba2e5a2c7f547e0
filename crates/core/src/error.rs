use thiserror::Error;

#[derive(Error, Debug)]
pub enum CadError {
    #[error("File type '{0}' not supported")]
    UnsupportedFormat(String),

    #[error("File size ({:.1}MB) exceeds limit of {}MB", megabytes(.actual), whole_megabytes(.limit))]
    FileTooLarge { actual: u64, limit: u64 },

    #[error("Download failed: {0}")]
    Download(String),

    #[error("{0}")]
    Conversion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / 1024.0 / 1024.0
}

fn whole_megabytes(bytes: &u64) -> u64 {
    *bytes / 1024 / 1024
}

impl CadError {
    /// True for failures caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CadError::UnsupportedFormat(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large_message_states_both_sizes() {
        let err = CadError::FileTooLarge {
            actual: 150 * 1024 * 1024,
            limit: 100 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "File size (150.0MB) exceeds limit of 100MB");
    }

    #[test]
    fn unsupported_names_the_type() {
        let err = CadError::UnsupportedFormat("iges".into());
        assert_eq!(err.to_string(), "File type 'iges' not supported");
        assert!(err.is_client_error());
    }
}
