//! Device Defender protocol error types.

use thiserror::Error;

/// Errors returned by the topic codec.
///
/// The variants carry only static data, so returning an error never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DefenderError {
    /// The caller broke an input contract (thing name length, variant value).
    #[error("bad parameter: {0}")]
    BadParameter(&'static str),

    /// The destination buffer cannot hold the full topic.
    #[error("buffer too small: topic needs {required} bytes, buffer holds {capacity}")]
    BufferTooSmall { required: usize, capacity: usize },

    /// The topic is not one of the Device Defender report topics.
    #[error("topic does not match any Device Defender API")]
    NoMatch,
}

/// Convenience alias for Device Defender results.
pub type DefenderResult<T> = Result<T, DefenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            DefenderError::BadParameter("thing name is empty").to_string(),
            "bad parameter: thing name is empty"
        );
        assert_eq!(
            DefenderError::BufferTooSmall {
                required: 42,
                capacity: 41
            }
            .to_string(),
            "buffer too small: topic needs 42 bytes, buffer holds 41"
        );
        assert_eq!(
            DefenderError::NoMatch.to_string(),
            "topic does not match any Device Defender API"
        );
    }
}
