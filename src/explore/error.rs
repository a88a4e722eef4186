use std::fmt;

// ============================================================================
// Error taxonomy
// ============================================================================
//
// Three failure families, with different loop consequences:
//   CaptureError    — fatal to the current step, the loop moves on
//   DecisionError   — retried with backoff; invalid credentials abort
//   ExecutionError  — counted as a step failure, never verified
//
// Verification is never an error: it always yields a VerificationResult.

#[derive(Debug)]
pub enum CaptureError {
    /// The platform inspector could not be reached or refused.
    InspectionFailed(String),

    /// The inspector answered with a tree we could not make sense of.
    MalformedTree(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::InspectionFailed(msg) => write!(f, "UI inspection failed: {}", msg),
            CaptureError::MalformedTree(msg) => write!(f, "Malformed element tree: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

#[derive(Debug)]
pub enum DecisionError {
    /// Provider rejected the credentials. Not retryable.
    InvalidCredentials(String),

    /// Provider rate limit hit.
    RateLimited(String),

    /// Provider answered with something that did not parse as a decision.
    MalformedResponse(String),

    /// Transport-level failure reaching the provider.
    Network(String),
}

impl DecisionError {
    /// Whether a bounded retry with backoff is worth attempting.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DecisionError::InvalidCredentials(_))
    }
}

impl fmt::Display for DecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionError::InvalidCredentials(msg) => write!(f, "Invalid credentials: {}", msg),
            DecisionError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            DecisionError::MalformedResponse(msg) => {
                write!(f, "Malformed decision response: {}", msg)
            }
            DecisionError::Network(msg) => write!(f, "Network failure: {}", msg),
        }
    }
}

impl std::error::Error for DecisionError {}

#[derive(Debug)]
pub enum ExecutionError {
    /// The driver does not know how to perform this action kind.
    UnknownAction(String),

    /// The action requires a target element but none was given.
    MissingTarget,

    /// A `type` action without text to type.
    MissingText,

    /// The target was named but is not on the current screen.
    ElementNotFound { element: String, context: String },

    /// The driver tried and the platform reported failure.
    ExecutionFailed(String),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::UnknownAction(action) => write!(f, "Unknown action: {}", action),
            ExecutionError::MissingTarget => write!(f, "Action requires a target element"),
            ExecutionError::MissingText => write!(f, "Type action requires text"),
            ExecutionError::ElementNotFound { element, context } => {
                write!(f, "Element '{}' not found: {}", element, context)
            }
            ExecutionError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
        }
    }
}

impl std::error::Error for ExecutionError {}
