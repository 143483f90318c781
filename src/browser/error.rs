use std::fmt;

#[derive(Debug)]
pub enum SessionError {
    /// Node.js locator server failed to spawn
    SubprocessSpawn { script: String, source: std::io::Error },

    /// Reading from or writing to the server pipes failed
    SessionIo(String),

    /// JSON parsing failed (server response or serde)
    JsonParse { context: String, source: serde_json::Error },

    /// JSON serialization failed (request to the server)
    JsonSerialize { context: String, source: serde_json::Error },

    /// The server reported a command failure
    Protocol { command: String, error: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::SubprocessSpawn { script, source } => {
                write!(f, "Failed to spawn {} (is Node.js installed?): {}", script, source)
            }
            SessionError::SessionIo(msg) => {
                write!(f, "Session I/O error: {}", msg)
            }
            SessionError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            SessionError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
            SessionError::Protocol { command, error } => {
                write!(f, "Session command '{}' failed: {}", command, error)
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::SubprocessSpawn { source, .. } => Some(source),
            SessionError::JsonParse { source, .. } => Some(source),
            SessionError::JsonSerialize { source, .. } => Some(source),
            _ => None,
        }
    }
}
