//! Error types for allocation commits.
//!
//! Commit errors carry structured context so the operator-facing notice and
//! the logs can say which batch failed and whether retrying makes sense.

use std::fmt;

/// Result type for commit operations
pub type CommitResult<T> = Result<T, CommitError>;

/// Structured context for commit errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "commit_changes")
    pub operation: Option<String>,
    /// Key of the batch involved
    pub batch_key: Option<String>,
    /// Opportunity the error refers to, if a single one
    pub opportunity_id: Option<String>,
    pub details: Option<String>,
    /// Whether re-invoking the commit may succeed
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_batch_key(mut self, key: impl Into<String>) -> Self {
        self.batch_key = Some(key.into());
        self
    }

    pub fn with_opportunity_id(mut self, id: impl ToString) -> Self {
        self.opportunity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref key) = self.batch_key {
            parts.push(format!("batch={}", key));
        }
        if let Some(ref id) = self.opportunity_id {
            parts.push(format!("opportunity={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for allocation commits
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommitError {
    /// The commit service could not be reached.
    #[error("Connection error: {message} {context}")]
    Connection {
        message: String,
        context: ErrorContext,
    },

    /// The commit service rejected the batch.
    #[error("Validation error: {message} {context}")]
    Rejected {
        message: String,
        context: ErrorContext,
    },

    /// The commit service did not answer in time.
    #[error("Timeout error: {message} {context}")]
    Timeout {
        message: String,
        context: ErrorContext,
    },

    /// Another commit is still in flight.
    #[error("Commit already in progress {context}")]
    InProgress { context: ErrorContext },

    #[error("Internal error: {message} {context}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl CommitError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn rejected_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Rejected {
            message: message.into(),
            context,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    pub fn in_progress() -> Self {
        Self::InProgress {
            context: ErrorContext::new("commit_changes").retryable(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Rejected { context, .. }
            | Self::Timeout { context, .. }
            | Self::InProgress { context }
            | Self::Internal { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Rejected { context, .. }
            | Self::Timeout { context, .. }
            | Self::InProgress { context }
            | Self::Internal { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add or update the batch key in the error context.
    pub fn with_batch_key(mut self, key: impl Into<String>) -> Self {
        self.context_mut().batch_key = Some(key.into());
        self
    }
}

impl From<serde_json::Error> for CommitError {
    fn from(err: serde_json::Error) -> Self {
        CommitError::internal(format!("Serialization error: {}", err))
    }
}
