//! NDR decoding errors

use thiserror::Error;

use crate::value::Value;

/// Errors raised while decoding an NDR stream or converting decoded values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NdrError {
    /// Fewer bytes remain than the read requires
    #[error("end of stream: needed {needed} bytes, have {have}")]
    EndOfStream { needed: usize, have: usize },

    /// Offset is not a multiple of the read width after alignment ran.
    /// This is an engine defect, never a data error.
    #[error("misaligned read: offset {offset} is not a multiple of {width}")]
    MisalignedRead { offset: usize, width: usize },

    /// Field annotations are missing information or combine invalidly
    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    /// Varying window exceeds the conformant maximum
    #[error("conformance mismatch: max_count={max_count}, actual_count={actual_count}")]
    ConformanceMismatch { max_count: u32, actual_count: u32 },

    /// Array size mismatch
    #[error("array size mismatch: expected {expected}, got {got}")]
    ArraySizeMismatch { expected: usize, got: usize },

    /// Malformed common or private header
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Array dimensions describe more elements than the decoder allows
    #[error("allocation limit exceeded: requested {requested} elements, limit {limit}")]
    AllocationLimitExceeded { requested: usize, limit: usize },

    /// Element count overflowed while multiplying dimensions
    #[error("integer overflow in array element count")]
    IntegerOverflow,

    /// A pointer refers to a referent that was never decoded
    #[error("dangling referent: ID 0x{0:08x}")]
    DanglingReferent(u32),

    /// A shared referent contains itself
    #[error("cyclic referent: ID 0x{0:08x}")]
    CyclicReferent(u32),

    /// Decoded value does not have the shape the target type expects
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Structure value has no field with this name
    #[error("missing field: {0}")]
    MissingField(String),

    /// Invalid string - bad UTF-16 or length out of range
    #[error("invalid string: {0}")]
    InvalidString(String),

    /// Error attributed to the field path where it occurred
    #[error("{path}: {source}")]
    AtField { path: String, source: Box<NdrError> },
}

/// Result type for NDR operations
pub type Result<T> = std::result::Result<T, NdrError>;

impl NdrError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedSchema(message.into())
    }

    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader(message.into())
    }

    pub fn type_mismatch(expected: &'static str, found: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.kind_name(),
        }
    }

    /// Prefix the error path with a field name.
    pub fn at_field(self, name: &str) -> Self {
        self.prefixed(name, |path| {
            if path.starts_with('[') {
                format!("{name}{path}")
            } else {
                format!("{name}.{path}")
            }
        })
    }

    /// Prefix the error path with an array index.
    pub fn at_index(self, index: usize) -> Self {
        let segment = format!("[{index}]");
        self.prefixed(&segment, |path| {
            if path.starts_with('[') {
                format!("{segment}{path}")
            } else {
                format!("{segment}.{path}")
            }
        })
    }

    /// Attach a fully rendered path. An empty path leaves the error untouched.
    pub fn at_path(self, path: String) -> Self {
        if path.is_empty() {
            return self;
        }
        match self {
            Self::AtField { path: inner, source } if inner.starts_with('[') => Self::AtField {
                path: format!("{path}{inner}"),
                source,
            },
            Self::AtField { path: inner, source } => Self::AtField {
                path: format!("{path}.{inner}"),
                source,
            },
            other => Self::AtField {
                path,
                source: Box::new(other),
            },
        }
    }

    fn prefixed(self, segment: &str, join: impl FnOnce(&str) -> String) -> Self {
        match self {
            Self::AtField { path, source } => Self::AtField {
                path: join(&path),
                source,
            },
            other => Self::AtField {
                path: segment.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with any path attribution removed
    pub fn root_cause(&self) -> &NdrError {
        match self {
            Self::AtField { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The field path the error is attributed to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::AtField { path, .. } => Some(path),
            _ => None,
        }
    }
}
