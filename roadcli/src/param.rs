//! Option and argument descriptors.
//!
//! Both are immutable once attached to a [`Command`](crate::Command); the
//! builders below only exist to make declaration sites readable.

use crate::error::DefinitionError;
use crate::value::{Value, ValueType};
use std::fmt;
use std::str::FromStr;

/// A named flag: `--name value`, `--name=value` or `-n value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Opt {
    pub(crate) name: String,
    pub(crate) short: Option<char>,
    pub(crate) value_type: ValueType,
    pub(crate) default: Value,
    pub(crate) required: bool,
    pub(crate) help: String,
    pub(crate) multiple: bool,
}

impl Opt {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            value_type: ValueType::String,
            default: Value::Null,
            required: false,
            help: String::new(),
            multiple: false,
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn integer(self) -> Self {
        self.value_type(ValueType::Integer)
    }

    pub fn float(self) -> Self {
        self.value_type(ValueType::Float)
    }

    pub fn boolean(self) -> Self {
        self.value_type(ValueType::Boolean)
    }

    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Mark as required. Only enforced in [`ParseMode::Strict`](crate::ParseMode::Strict).
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Accumulate repeated occurrences into a list instead of keeping the last one.
    ///
    /// A scalar default is stored as a one-element list.
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_alias(&self) -> Option<char> {
        self.short
    }

    pub fn kind(&self) -> ValueType {
        self.value_type
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }
}

/// How many positional tokens an [`Arg`] binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nargs {
    /// `""`: exactly one.
    #[default]
    One,
    /// `"?"`: zero or one.
    Optional,
    /// `"*"`: zero or more.
    ZeroOrMore,
    /// `"+"`: one or more.
    OneOrMore,
}

impl Nargs {
    /// Variadic arguments absorb every remaining positional token.
    pub fn is_variadic(self) -> bool {
        matches!(self, Nargs::ZeroOrMore | Nargs::OneOrMore)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Nargs::One => "",
            Nargs::Optional => "?",
            Nargs::ZeroOrMore => "*",
            Nargs::OneOrMore => "+",
        }
    }
}

impl FromStr for Nargs {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Nargs::One),
            "?" => Ok(Nargs::Optional),
            "*" => Ok(Nargs::ZeroOrMore),
            "+" => Ok(Nargs::OneOrMore),
            other => Err(DefinitionError::InvalidNargs(other.to_string())),
        }
    }
}

impl fmt::Display for Nargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positional parameter. Declaration order defines binding order.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub(crate) name: String,
    pub(crate) value_type: ValueType,
    pub(crate) required: bool,
    pub(crate) default: Value,
    pub(crate) help: String,
    pub(crate) nargs: Nargs,
}

impl Arg {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: ValueType::String,
            required: true,
            default: Value::Null,
            help: String::new(),
            nargs: Nargs::One,
        }
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn integer(self) -> Self {
        self.value_type(ValueType::Integer)
    }

    pub fn float(self) -> Self {
        self.value_type(ValueType::Float)
    }

    pub fn boolean(self) -> Self {
        self.value_type(ValueType::Boolean)
    }

    /// Mark as required. Only enforced in [`ParseMode::Strict`](crate::ParseMode::Strict).
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = nargs;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueType {
        self.value_type
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn arity(&self) -> Nargs {
        self.nargs
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }
}
