use super::value::UniformKind;

/// Errors produced by the uniform packer and its upload path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniformError {
    #[error("uniform name must not be empty")]
    EmptyName,

    #[error("uniform `{0}` is already defined")]
    DuplicateName(String),

    #[error("uniform `{0}` not found")]
    NotFound(String),

    #[error("type mismatch for uniform `{name}`: stored {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },

    /// A padding gap outside {4, 8, 12} bytes. Only reachable if a kind with an
    /// alignment outside {4, 8, 16} is introduced.
    #[error("unsupported padding of {gap} bytes at offset {offset} (alignment {align})")]
    Alignment { offset: u64, align: u64, gap: u64 },

    /// Buffer allocation or transfer failed.
    #[error("uniform buffer resource error: {0}")]
    Resource(String),
}

pub type Result<T> = std::result::Result<T, UniformError>;
