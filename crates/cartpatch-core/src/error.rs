use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Access of {len} bytes at offset {offset:#x} exceeds buffer size {size:#x}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("Malformed IPS patch: cannot read {field} at read position {position:#x}")]
    MalformedPatch {
        position: usize,
        field: &'static str,
    },

    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    #[error("Signature found. ROM already patched")]
    AlreadyPatched,

    #[error("Unexpected entrypoint instruction {0:#010x}")]
    UnexpectedEntrypoint(u32),

    #[error("ROM already max size ({size:#x} bytes). Cannot install payload")]
    RomFull { size: usize },

    #[error(
        "Could not find a write function to hook. Does the game save, and has it been SRAM patched?"
    )]
    NoWriteHookFound,

    #[error("No patch set for save type {0}")]
    UnsupportedSaveType(String),

    #[error("ROM too large: {size:#x} bytes (maximum {max:#x})")]
    RomTooLarge { size: usize, max: usize },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Whether the input ROM was rejected as unsupported rather than failing mid-patch.
    ///
    /// These errors mean the image is not something the engine recognizes; retrying
    /// the same operation on the same bytes will fail the same way.
    pub fn is_unsupported_rom(&self) -> bool {
        matches!(
            self,
            Error::AlreadyPatched
                | Error::PatternNotFound(_)
                | Error::UnexpectedEntrypoint(_)
                | Error::NoWriteHookFound
                | Error::RomTooLarge { .. }
        )
    }
}
