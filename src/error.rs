//! Pipeline error type.

use thiserror::Error;

/// Errors raised while parsing or executing a pipeline definition.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A DSL line failed to parse. Line numbers are 1-based.
    #[error("line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// An input data line is not a valid employee record.
    #[error("bad record at line {line}: {msg}")]
    BadRecord { line: usize, msg: String },

    /// The pipeline definition contains no stages.
    #[error("pipeline is empty")]
    EmptyPipeline,

    /// A pipeline needs a source and at least one downstream stage.
    #[error("pipeline must have at least 2 stages")]
    TooFewStages,

    /// The first stage must generate or read records.
    #[error("{stage} cannot be the first stage (try CONSOLE, LITERAL, or HOLE)")]
    NotASource { stage: &'static str },

    /// Summary stages consume the whole stream and emit text, so nothing
    /// can follow them.
    #[error("{stage} must be the last stage")]
    SummaryNotLast { stage: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_converts_and_stays_transparent() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
        assert_eq!(err.to_string(), "no such file");
    }

    #[test]
    fn test_parse_error_carries_line_number() {
        let err = PipelineError::Parse {
            line: 3,
            msg: "unknown field: WAGE".to_string(),
        };
        assert_eq!(err.to_string(), "line 3: unknown field: WAGE");
    }
}
