//! Crate-level error type shared by the encoder, decoder and settings loader.
//!
//! `GcodeError` is serialized to `{ kind, message }` payloads so decode
//! diagnostics can be exported alongside a motion snapshot.

/// Every fatal condition the crate can report.
///
/// Serialized with serde's adjacently-tagged representation:
/// `{ "kind": "<variant>", "message": <payload> }`
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum GcodeError {
    /// Batched per-axis inputs did not have the same number of rows.
    #[error("batched axis inputs differ in length (x: {x}, y: {y}, z: {z})")]
    ArgumentLengthMismatch { x: usize, y: usize, z: usize },

    /// A positional array was neither a flat triple nor an `(n, 3)` table.
    #[error("positional input must have shape {expected} but has shape {found}")]
    InvalidBatchShape { expected: String, found: String },

    /// A settings lookup used a category outside `position`/`speed`/`extrusion`.
    #[error("unknown format category: {0}")]
    UnknownFormatCategory(String),

    /// The decoder met a parameter letter the command does not accept.
    #[error("unknown parameter {token} passed to command {command}")]
    UnknownParameter { token: String, command: String },

    /// The decoder met a parameter whose value is not a valid number.
    #[error("invalid value in {token} for command {command}")]
    InvalidParameterValue { token: String, command: String },

    /// The decoder met a mnemonic that is not in the dispatch table.
    #[error("unknown command {0}")]
    UnknownCommand(String),

    /// A growable buffer was constructed with a growth factor of 1 or less.
    #[error("growth factor must be greater than 1, got {0}")]
    InvalidGrowthFactor(f64),

    /// A checked buffer read went past the logical length.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A line read from a byte source was not valid UTF-8.
    #[error("line is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// A dwell was requested without a duration.
    #[error("no time given to dwell")]
    MissingDwellTime,

    /// A settings profile failed to parse or validate.
    #[error("config error: {0}")]
    Config(String),

    /// The external line source failed; the inner [`std::io::Error`] is
    /// stringified so the variant stays serializable.
    #[error("{0}")]
    Io(String),
}

impl From<std::io::Error> for GcodeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Non-fatal advisories raised while recording motion.
///
/// Callers keep processing after a warning; the document accumulates them
/// in [`crate::Document::warnings`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionWarning {
    /// The first motion was recorded before any feed rate was set, so the
    /// move durations that depend on it are unknown.
    FeedRateUnset {
        /// Number of lines written when the warning was raised.
        line: usize,
    },
}

impl std::fmt::Display for MotionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotionWarning::FeedRateUnset { line } => {
                write!(f, "print speed not set at line {line}; print times are unknown")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_serializes_to_kind_message() {
        let err = GcodeError::UnknownCommand("G2".to_string());
        let value = serde_json::to_value(&err).expect("serialize GcodeError::UnknownCommand");
        assert_eq!(value["kind"], "UnknownCommand");
        assert_eq!(value["message"], "G2");
    }

    #[test]
    fn unknown_parameter_carries_token_and_command() {
        let err = GcodeError::UnknownParameter {
            token: "Q5".to_string(),
            command: "G1".to_string(),
        };
        let value = serde_json::to_value(&err).expect("serialize");
        assert_eq!(value["kind"], "UnknownParameter");
        assert_eq!(value["message"]["token"], "Q5");
        assert_eq!(value["message"]["command"], "G1");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err = GcodeError::from(io_err);
        assert!(matches!(err, GcodeError::Io(_)));
        assert_eq!(err.to_string(), "truncated");
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(
            GcodeError::ArgumentLengthMismatch { x: 3, y: 2, z: 3 }.to_string(),
            "batched axis inputs differ in length (x: 3, y: 2, z: 3)"
        );
        assert_eq!(GcodeError::MissingDwellTime.to_string(), "no time given to dwell");
        assert_eq!(
            GcodeError::IndexOutOfRange { index: 4, len: 2 }.to_string(),
            "index 4 is out of range for length 2"
        );
    }

    #[test]
    fn feed_rate_warning_serializes_with_kind_tag() {
        let warning = MotionWarning::FeedRateUnset { line: 1 };
        let value = serde_json::to_value(&warning).expect("serialize");
        assert_eq!(value["kind"], "feed_rate_unset");
        assert_eq!(value["line"], 1);
    }
}
