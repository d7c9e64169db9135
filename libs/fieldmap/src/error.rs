use std::fmt;

/// Error type reported by hooks and row-fetch collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a single value could not be written into a field.
#[derive(Debug, thiserror::Error)]
pub enum Reason {
    #[error("provided value ({value}) type {actual} not match field of type '{expected}'")]
    Mismatch {
        value: String,
        actual: String,
        expected: String,
    },

    /// Custom decode hook failure, reported verbatim.
    #[error("{0}")]
    Hook(BoxError),

    #[error("time conversion: {0}")]
    Time(#[from] chrono::ParseError),

    #[error("nested error: {0}")]
    Nested(#[from] FillError),

    #[error("cannot set element {index}: {source}")]
    Element { index: usize, source: Box<Reason> },
}

/// One field-scoped failure of a fill call.
#[derive(Debug, thiserror::Error)]
#[error("field '{key}' of scheme '{scheme}': {reason}")]
pub struct FieldError {
    pub scheme: String,
    pub key: String,
    #[source]
    pub reason: Reason,
}

impl FieldError {
    pub fn new(scheme: impl Into<String>, key: impl Into<String>, reason: Reason) -> Self {
        Self {
            scheme: scheme.into(),
            key: key.into(),
            reason,
        }
    }
}

/// Every per-field failure of a fill call, in the order they were hit.
///
/// Filling never stops at the first failure: all resolvable fields are
/// written and the rest are collected here.
#[derive(Debug, Default)]
pub struct FillError {
    errors: Vec<FieldError>,
}

impl FillError {
    /// `Ok(())` when nothing failed.
    pub fn check(errors: Vec<FieldError>) -> Result<(), FillError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FillError { errors })
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Field keys that failed, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.key.as_str())
    }
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FillError {}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The row source's own error, unmodified.
    #[error("{0}")]
    Fetch(BoxError),

    #[error(transparent)]
    Fill(#[from] FillError),
}
