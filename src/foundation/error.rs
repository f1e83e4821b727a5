/// Convenience result type used across augsweep.
pub type AugsweepResult<T> = Result<T, AugsweepError>;

/// Top-level error taxonomy used by catalog, sampler, composer and engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum AugsweepError {
    /// Malformed parameter data: bad range bounds, overrides outside the declared range.
    #[error("invalid parameter spec: {0}")]
    InvalidParameterSpec(String),

    /// Operator name not present in the catalog.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// Operator is cataloged but has no registered implementation.
    #[error("missing operator binding: {0}")]
    MissingBinding(String),

    /// The job selects no operators.
    #[error("no operators selected")]
    NoOperatorsSelected,

    /// The input source yields no items.
    #[error("no input items found: {0}")]
    NoInputItemsFound(String),

    /// Per-item load/save failure, or an output root that cannot be created.
    #[error("io error: {0}")]
    Io(String),

    /// Failure reported by an operator implementation.
    #[error("operator error: {0}")]
    Operator(String),

    /// A job is already running on this engine.
    #[error("a job is already running")]
    JobAlreadyRunning,

    /// Invalid user-provided job configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing job files and reports.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Copyable discriminant of [`AugsweepError`], stored in per-unit error records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidParameterSpec,
    UnknownOperator,
    MissingBinding,
    NoOperatorsSelected,
    NoInputItemsFound,
    Io,
    Operator,
    JobAlreadyRunning,
    Validation,
    Serde,
    Other,
}

impl AugsweepError {
    /// Build a [`AugsweepError::InvalidParameterSpec`] value.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParameterSpec(msg.into())
    }

    /// Build a [`AugsweepError::UnknownOperator`] value.
    pub fn unknown_operator(name: impl Into<String>) -> Self {
        Self::UnknownOperator(name.into())
    }

    /// Build a [`AugsweepError::MissingBinding`] value.
    pub fn missing_binding(name: impl Into<String>) -> Self {
        Self::MissingBinding(name.into())
    }

    /// Build a [`AugsweepError::NoInputItemsFound`] value.
    pub fn no_items(msg: impl Into<String>) -> Self {
        Self::NoInputItemsFound(msg.into())
    }

    /// Build a [`AugsweepError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`AugsweepError::Operator`] value.
    pub fn operator(msg: impl Into<String>) -> Self {
        Self::Operator(msg.into())
    }

    /// Build a [`AugsweepError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`AugsweepError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameterSpec(_) => ErrorKind::InvalidParameterSpec,
            Self::UnknownOperator(_) => ErrorKind::UnknownOperator,
            Self::MissingBinding(_) => ErrorKind::MissingBinding,
            Self::NoOperatorsSelected => ErrorKind::NoOperatorsSelected,
            Self::NoInputItemsFound(_) => ErrorKind::NoInputItemsFound,
            Self::Io(_) => ErrorKind::Io,
            Self::Operator(_) => ErrorKind::Operator,
            Self::JobAlreadyRunning => ErrorKind::JobAlreadyRunning,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Serde(_) => ErrorKind::Serde,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Re-tag a wrapped lower-level failure as a per-unit IO error, keeping its context chain.
    pub fn into_io(self) -> Self {
        match self {
            Self::Other(e) => Self::Io(format!("{e:#}")),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
