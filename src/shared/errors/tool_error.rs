use thiserror::Error;

/// Failures of an external command-line tool (separator, transcoder)
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{tool} not found on PATH")]
    NotFound { tool: String },

    #[error("{tool} exited with {}", describe_exit(.exit_code))]
    Failure {
        tool: String,
        exit_code: Option<i32>,
    },

    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Classify a spawn/read error, keeping "command not found" distinct
    pub fn from_io(tool: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound {
                tool: tool.to_string(),
            }
        } else {
            ToolError::Io {
                tool: tool.to_string(),
                source: err,
            }
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_not_found() {
        let err = ToolError::from_io(
            "demucs",
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        );
        assert!(matches!(err, ToolError::NotFound { tool } if tool == "demucs"));
    }

    #[test]
    fn test_failure_message_includes_exit_code() {
        let err = ToolError::Failure {
            tool: "ffmpeg".to_string(),
            exit_code: Some(1),
        };
        assert_eq!(err.to_string(), "ffmpeg exited with exit code 1");
    }
}
