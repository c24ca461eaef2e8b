use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request does not name a target interface")]
    NoTarget,

    #[error("missing required attribute {0}")]
    MissingAttribute(&'static str),

    #[error("invalid attribute {attr}: {reason}")]
    InvalidAttribute { attr: String, reason: String },

    #[error("interface {0} already exists")]
    AlreadyExists(String),

    #[error("{command} exited with {}", exit_status(.status))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        output: Vec<String>,
    },

    #[error("unable to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse listing: {0}")]
    Parse(String),

    #[error("unable to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to open ioctl socket: {0}")]
    Socket(#[source] io::Error),

    #[error("unable to resolve interface {0}")]
    Resolve(String),

    #[error("failed to set {}", .0.join(", "))]
    SetFailed(Vec<String>),

    #[error("operation {operation} is not supported on {key}")]
    Unsupported { operation: String, key: String },
}

fn exit_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".into(),
    }
}

impl Error {
    pub(crate) fn invalid(attr: &str, reason: impl Into<String>) -> Self {
        Error::InvalidAttribute {
            attr: attr.into(),
            reason: reason.into(),
        }
    }
}
