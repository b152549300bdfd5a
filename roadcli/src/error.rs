//! Error types for parsing, registration and dispatch.
//!
//! Parse failures and user-fixable handler failures exit with code 1,
//! system failures with code 101.

use crate::value::ValueType;
use thiserror::Error;

/// CLI result type.
///
/// Handlers and hooks return `CliResult<T>`; an `Err` reaches the single
/// error boundary in [`Cli::run`](crate::Cli::run).
pub type CliResult<T> = Result<T, CliError>;

/// Failures raised while turning a token stream into a [`Context`](crate::Context).
///
/// Raw tokens are escaped in messages so a diagnostic stays on one line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A token could not be coerced into the declared value type.
    #[error("invalid value '{}' for '{}': expected {}", .token.escape_debug(), .name, .expected)]
    Conversion {
        token: String,
        expected: ValueType,
        name: String,
    },

    /// Unknown `--long` or `-s` option (strict mode only).
    #[error("unknown option '{}'", .0.escape_debug())]
    UnknownOption(String),

    /// Option given as the last token with nothing left to consume (strict mode only).
    #[error("option '--{0}' requires a value")]
    MissingValue(String),

    /// More positional tokens than declared arguments (strict mode only).
    #[error("unexpected argument '{}'", .0.escape_debug())]
    UnexpectedArgument(String),

    /// Required option neither supplied nor defaulted (strict mode only).
    #[error("missing required option '--{0}'")]
    MissingOption(String),

    /// Required argument neither supplied nor defaulted (strict mode only).
    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    /// A typed field could not be read out of a parsed context.
    #[error("cannot read '{name}' as {expected}")]
    Extract { name: String, expected: &'static str },
}

impl ParseError {
    pub(crate) fn conversion(
        token: impl Into<String>,
        expected: ValueType,
        name: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            token: token.into(),
            expected,
            name: name.into(),
        }
    }
}

/// Problems with a command definition, reported when it is registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("command '{command}' already declares option '--{name}'")]
    DuplicateOption { command: String, name: String },

    #[error("command '{command}' already uses short alias '-{short}'")]
    DuplicateShort { command: String, short: char },

    #[error("command '{command}' already declares argument '{name}'")]
    DuplicateArgument { command: String, name: String },

    /// Only the last declared argument may be variadic.
    #[error("argument '{name}' on '{command}' follows variadic argument '{variadic}'")]
    ArgumentAfterVariadic {
        command: String,
        name: String,
        variadic: String,
    },

    #[error("default for '{name}' does not match its type {expected}")]
    DefaultTypeMismatch { name: String, expected: ValueType },

    #[error("unknown nargs '{0}' (expected one of \"\", \"?\", \"*\", \"+\")")]
    InvalidNargs(String),
}

/// Top-level error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// The token stream could not be parsed (exit code 1).
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// User-fixable errors (exit code 1).
    #[error(transparent)]
    User(#[from] UserError),

    /// System-level failures (exit code 101).
    #[error(transparent)]
    System(#[from] SystemError),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Parse(_) | CliError::User(_) => 1,
            CliError::System(_) => 101,
        }
    }

    /// Convenience constructor for user errors.
    pub fn user(message: impl Into<String>) -> Self {
        CliError::User(UserError::Generic(message.into()))
    }

    /// Convenience constructor for system errors.
    pub fn system(message: impl Into<String>) -> Self {
        CliError::System(SystemError::Internal(message.into()))
    }
}

/// User-fixable errors (exit code 1).
///
/// Messages stay on one line; the dispatcher prints them as a single diagnostic.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Generic(String),

    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument { arg: String, reason: String },

    /// An external tool the handler shells out to is not installed.
    #[error("missing dependency '{tool}' (hint: {install_hint})")]
    MissingDependency { tool: String, install_hint: String },

    /// Handler-level checks on parsed values failed; one entry per problem.
    #[error("validation failed: {}", details.join("; "))]
    ValidationFailed { details: Vec<String> },

    /// The environment is not ready for the command, such as a missing login.
    #[error("prerequisite not met: {check} (hint: {fix_hint})")]
    PrerequisiteNotMet { check: String, fix_hint: String },
}

/// System-level failures (exit code 101).
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// An application config file read by the handler could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::System(SystemError::Io(e))
    }
}
