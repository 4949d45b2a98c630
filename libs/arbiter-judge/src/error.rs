// Error taxonomy for the judging pipeline
use thiserror::Error;

/// Deny-listed construct or oversize source; fatal to the whole run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityViolation {
    #[error("Forbidden API detected: {0}")]
    ForbiddenApi(&'static str),
    #[error("Code exceeds maximum length of {0} characters")]
    TooLong(usize),
}

/// Toolchain rejected the source or could not be driven; fatal to the whole run
#[derive(Debug, Error)]
pub enum CompilationError {
    #[error("Could not find public class declaration")]
    NoTypeName,
    #[error("Class name {0} is reserved")]
    ReservedName(String),
    /// Rendered `Line N: message` diagnostics
    #[error("{0}")]
    Diagnostics(String),
    #[error("Compilation timed out after {0}ms")]
    Timeout(u64),
    #[error("Java compiler not available: {0}")]
    ToolchainUnavailable(String),
    #[error("Failed to inspect compiled class: {0}")]
    Introspection(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One link of a fault chain raised by submitted code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Simple class name, e.g. `ArithmeticException`
    pub name: String,
    pub message: Option<String>,
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => write!(f, "{}: {}", self.name, message),
            _ => f.write_str(&self.name),
        }
    }
}

/// Renders an outermost-first chain as `Name: msg (Caused by: Root: msg)`
pub fn describe_chain(chain: &[Fault]) -> String {
    match chain {
        [] => "Unknown error".to_string(),
        [only] => only.to_string(),
        [first, .., root] => format!("{} (Caused by: {})", first, root),
    }
}

/// Failure while executing a plan against a compiled unit
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Submitted code threw; outermost link first
    #[error("{}", describe_chain(.0))]
    Raised(Vec<Fault>),
    #[error("NoSuchMethodException: {0}")]
    NotFound(String),
    /// Runtime died without completing the plan
    #[error("Process crashed: {0}")]
    Crashed(String),
    #[error("Failed to launch runtime: {0}")]
    Launch(#[from] std::io::Error),
    #[error("Malformed harness output: {0}")]
    Protocol(String),
}

/// Test input could not be converted to the declared parameter types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("NumberFormatException: For input string: \"{0}\"")]
    Number(String),
    #[error("StringIndexOutOfBoundsException: empty character value")]
    EmptyChar,
}

/// Pre-execution failure that aborts a whole judge run
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Security violation: {0}")]
    Security(#[from] SecurityViolation),
    #[error("Compilation error: {0}")]
    Compilation(#[from] CompilationError),
}
