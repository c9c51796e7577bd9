#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("container `{container}` is its own ancestor")]
    CycleDependency { container: String },

    #[error("invalid graph structure: {message}")]
    InvalidStructure { message: String },

    #[error(
        "rank constraints on `{first}` and `{second}` pull the same nodes to opposite extremes within `{scope}`"
    )]
    OppositeRank {
        first: String,
        second: String,
        scope: String,
    },

    #[error("malformed record label at position {position}: {message}")]
    LabelFormat { position: usize, message: String },

    #[error("layout failed: {message}")]
    Execution { message: String },

    #[error("invalid layout configuration: {message}")]
    Config { message: String },
}

impl Error {
    pub(crate) fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    pub(crate) fn label_format(position: usize, message: impl Into<String>) -> Self {
        Self::LabelFormat {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
