//! Parse results.

use crate::command::Command;
use crate::error::ParseError;
use crate::value::{FromValue, Value};
use std::collections::BTreeMap;

/// The resolved values of one parse, bound to the command it resolved to.
///
/// A context borrows the command tree and exclusively owns its value maps.
/// When produced by subcommand delegation it owns the context of the level
/// above it as `parent`; the chain is never walked downward.
#[derive(Debug)]
pub struct Context<'cmd> {
    command: &'cmd Command,
    pub(crate) options: BTreeMap<String, Value>,
    pub(crate) arguments: BTreeMap<String, Value>,
    parent: Option<Box<Context<'cmd>>>,
}

impl<'cmd> Context<'cmd> {
    pub(crate) fn new(command: &'cmd Command, parent: Option<Box<Context<'cmd>>>) -> Self {
        Self {
            command,
            options: BTreeMap::new(),
            arguments: BTreeMap::new(),
            parent,
        }
    }

    /// The deepest command reached along the subcommand chain.
    pub fn command(&self) -> &'cmd Command {
        self.command
    }

    pub fn parent(&self) -> Option<&Context<'cmd>> {
        self.parent.as_deref()
    }

    /// Parent contexts, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Context<'cmd>> {
        std::iter::successors(self.parent(), |ctx| ctx.parent())
    }

    /// Command names from the root down to this context.
    pub fn path(&self) -> Vec<&'cmd str> {
        let mut path: Vec<&str> = self.ancestors().map(|ctx| ctx.command.name()).collect();
        path.reverse();
        path.push(self.command.name());
        path
    }

    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    pub fn arguments(&self) -> &BTreeMap<String, Value> {
        &self.arguments
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Look a name up among options first, then arguments.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.option(name).or_else(|| self.argument(name))
    }

    /// Typed lookup; `None` when missing or of another type.
    pub fn get<T: FromValue>(&self, name: &str) -> Option<T> {
        self.value(name).and_then(T::from_value)
    }

    pub fn get_or<T: FromValue>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    /// Typed lookup that reports which field failed.
    ///
    /// A missing name reads as `Null`, so `Option<T>` fields extract as `None`.
    pub fn field<T: FromValue>(&self, name: &str) -> Result<T, ParseError> {
        let value = self.value(name).unwrap_or(&Value::Null);
        T::from_value(value).ok_or_else(|| ParseError::Extract {
            name: name.to_string(),
            expected: T::EXPECTED,
        })
    }

    /// Build a typed view of this context, usually via `#[derive(FromContext)]`.
    pub fn extract<T: FromContext>(&self) -> Result<T, ParseError> {
        T::from_context(self)
    }

    /// JSON view of this level: command name, options and arguments.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "command": self.command.name(),
            "options": self.options,
            "arguments": self.arguments,
        })
    }
}

/// Types that can be built from a parsed [`Context`].
pub trait FromContext: Sized {
    fn from_context(ctx: &Context<'_>) -> Result<Self, ParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_prefers_options() {
        let cmd = Command::new("demo");
        let mut ctx = Context::new(&cmd, None);
        ctx.options.insert("name".into(), Value::from("opt"));
        ctx.arguments.insert("name".into(), Value::from("arg"));
        ctx.arguments.insert("file".into(), Value::from("a.txt"));

        assert_eq!(ctx.get::<String>("name").as_deref(), Some("opt"));
        assert_eq!(ctx.get::<String>("file").as_deref(), Some("a.txt"));
        assert_eq!(ctx.get_or("missing", 5i64), 5);
    }

    #[test]
    fn test_field_reports_name_and_type() {
        let cmd = Command::new("demo");
        let mut ctx = Context::new(&cmd, None);
        ctx.options.insert("count".into(), Value::from("x"));

        let err = ctx.field::<i64>("count").unwrap_err();
        assert_eq!(
            err,
            ParseError::Extract {
                name: "count".into(),
                expected: "integer"
            }
        );
        assert_eq!(ctx.field::<Option<String>>("absent").unwrap(), None);
    }

    #[test]
    fn test_path_and_ancestors() {
        let root = Command::new("app");
        let db = Command::new("db");
        let migrate = Command::new("migrate");

        let root_ctx = Context::new(&root, None);
        let db_ctx = Context::new(&db, Some(Box::new(root_ctx)));
        let ctx = Context::new(&migrate, Some(Box::new(db_ctx)));

        assert_eq!(ctx.path(), vec!["app", "db", "migrate"]);
        assert_eq!(ctx.ancestors().count(), 2);
        assert_eq!(ctx.parent().unwrap().command().name(), "db");
    }

    #[test]
    fn test_to_json() {
        let cmd = Command::new("greet");
        let mut ctx = Context::new(&cmd, None);
        ctx.options.insert("count".into(), Value::Integer(3));

        let json = ctx.to_json();
        assert_eq!(json["command"], "greet");
        assert_eq!(json["options"]["count"], 3);
        assert_eq!(json["arguments"], serde_json::json!({}));
    }
}
