//! The command tree and its registration handle.

use crate::console::Console;
use crate::context::Context;
use crate::error::{CliResult, DefinitionError};
use crate::param::{Arg, Opt};
use crate::value::Value;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::fmt;

/// Type-erased handler stored on a [`Command`].
pub type Handler = dyn Fn(&Context<'_>, &mut Console) -> CliResult<i32> + Send + Sync;

pub(crate) type BoxedHandler = Box<Handler>;

/// Conversion of handler return values into an exit code.
///
/// Anything that is not an integer counts as success.
pub trait IntoExitCode {
    fn into_exit_code(self) -> i32;
}

impl IntoExitCode for i32 {
    fn into_exit_code(self) -> i32 {
        self
    }
}

impl IntoExitCode for () {
    fn into_exit_code(self) -> i32 {
        0
    }
}

impl IntoExitCode for Option<i32> {
    fn into_exit_code(self) -> i32 {
        self.unwrap_or(0)
    }
}

pub(crate) fn boxed_handler<F, R>(handler: F) -> BoxedHandler
where
    F: Fn(&Context<'_>, &mut Console) -> CliResult<R> + Send + Sync + 'static,
    R: IntoExitCode,
{
    Box::new(move |ctx: &Context<'_>, console: &mut Console| {
        handler(ctx, console).map(IntoExitCode::into_exit_code)
    })
}

/// A node of the dispatch tree.
///
/// Built once during registration and only read while parsing.
pub struct Command {
    name: String,
    help: String,
    handler: Option<BoxedHandler>,
    options: Vec<Opt>,
    arguments: Vec<Arg>,
    subcommands: IndexMap<String, Command>,
}

impl Command {
    /// A command without a handler; resolving to it renders its help.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            handler: None,
            options: Vec::new(),
            arguments: Vec::new(),
            subcommands: IndexMap::new(),
        }
    }

    pub fn with_handler<F, R>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Context<'_>, &mut Console) -> CliResult<R> + Send + Sync + 'static,
        R: IntoExitCode,
    {
        let mut command = Self::new(name);
        command.handler = Some(boxed_handler(handler));
        command
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_deref()
    }

    pub fn options(&self) -> &[Opt] {
        &self.options
    }

    pub fn arguments(&self) -> &[Arg] {
        &self.arguments
    }

    pub fn subcommands(&self) -> impl Iterator<Item = &Command> {
        self.subcommands.values()
    }

    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.get(name)
    }

    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Look up an option by its long name.
    pub fn find_option(&self, name: &str) -> Option<&Opt> {
        self.options.iter().find(|opt| opt.name == name)
    }

    /// Look up an option by its single-character alias.
    pub fn find_short(&self, short: char) -> Option<&Opt> {
        self.options.iter().find(|opt| opt.short == Some(short))
    }

    /// The trailing variadic argument, if one is declared.
    pub fn variadic(&self) -> Option<&Arg> {
        self.arguments.last().filter(|arg| arg.nargs.is_variadic())
    }

    /// Follow a path of subcommand names down from this node.
    pub fn find<'p>(&self, path: impl IntoIterator<Item = &'p str>) -> Option<&Command> {
        path.into_iter()
            .try_fold(self, |command, name| command.subcommand(name))
    }

    pub fn add_option(&mut self, mut opt: Opt) -> Result<(), DefinitionError> {
        if self.find_option(&opt.name).is_some() {
            return Err(DefinitionError::DuplicateOption {
                command: self.name.clone(),
                name: opt.name,
            });
        }
        if let Some(short) = opt.short {
            if self.find_short(short).is_some() {
                return Err(DefinitionError::DuplicateShort {
                    command: self.name.clone(),
                    short,
                });
            }
        }
        if !opt.value_type.accepts(&opt.default) {
            return Err(DefinitionError::DefaultTypeMismatch {
                name: opt.name,
                expected: opt.value_type,
            });
        }
        opt.default = opt.value_type.normalize(opt.default);
        if opt.multiple {
            opt.default = into_list(opt.default);
        }
        self.options.push(opt);
        Ok(())
    }

    pub fn add_argument(&mut self, mut arg: Arg) -> Result<(), DefinitionError> {
        if self.arguments.iter().any(|existing| existing.name == arg.name) {
            return Err(DefinitionError::DuplicateArgument {
                command: self.name.clone(),
                name: arg.name,
            });
        }
        if let Some(variadic) = self.variadic() {
            return Err(DefinitionError::ArgumentAfterVariadic {
                command: self.name.clone(),
                name: arg.name,
                variadic: variadic.name.clone(),
            });
        }
        if !arg.value_type.accepts(&arg.default) {
            return Err(DefinitionError::DefaultTypeMismatch {
                name: arg.name,
                expected: arg.value_type,
            });
        }
        arg.default = arg.value_type.normalize(arg.default);
        if arg.nargs.is_variadic() {
            arg.default = into_list(arg.default);
        }
        self.arguments.push(arg);
        Ok(())
    }

    /// Attach a child. A child with the same name is replaced in place.
    pub fn add_subcommand(&mut self, command: Command) -> &mut Command {
        match self.subcommands.entry(command.name.clone()) {
            Entry::Occupied(mut entry) => {
                tracing::warn!(
                    parent = %self.name,
                    command = %command.name,
                    "Replacing previously registered subcommand"
                );
                entry.insert(command);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(command),
        }
    }
}

/// Repeatable descriptors resolve to a list whether or not they were supplied.
fn into_list(default: Value) -> Value {
    match default {
        Value::Null | Value::List(_) => default,
        scalar => Value::List(vec![scalar]),
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("handler", &self.handler.is_some())
            .field("options", &self.options)
            .field("arguments", &self.arguments)
            .field("subcommands", &self.subcommands.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registration handle bound to the [`Command`] being built.
///
/// Options and arguments are attached directly to the command the handle
/// points at, so declarations work at any nesting depth.
///
/// # Example
///
/// ```
/// use roadcli::{Cli, Opt};
///
/// let mut cli = Cli::new("myapp");
/// let mut db = cli.group("db");
/// db.about("Database commands");
/// db.command("migrate", |_ctx, _console| Ok(0))
///     .about("Run migrations")
///     .option(Opt::new("steps").integer().default(1))
///     .unwrap();
///
/// assert!(cli.root().find(["db", "migrate"]).is_some());
/// ```
pub struct CommandBuilder<'a> {
    command: &'a mut Command,
}

/// A namespace command whose own handler does nothing.
pub type Group<'a> = CommandBuilder<'a>;

impl<'a> CommandBuilder<'a> {
    pub fn new(command: &'a mut Command) -> Self {
        Self { command }
    }

    pub fn about(&mut self, help: impl Into<String>) -> &mut Self {
        self.command.help = help.into();
        self
    }

    pub fn handler<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Context<'_>, &mut Console) -> CliResult<R> + Send + Sync + 'static,
        R: IntoExitCode,
    {
        self.command.handler = Some(boxed_handler(handler));
        self
    }

    pub fn option(&mut self, opt: Opt) -> Result<&mut Self, DefinitionError> {
        self.command.add_option(opt)?;
        Ok(self)
    }

    pub fn argument(&mut self, arg: Arg) -> Result<&mut Self, DefinitionError> {
        self.command.add_argument(arg)?;
        Ok(self)
    }

    /// Register a child command with a handler.
    pub fn command<F, R>(&mut self, name: impl Into<String>, handler: F) -> CommandBuilder<'_>
    where
        F: Fn(&Context<'_>, &mut Console) -> CliResult<R> + Send + Sync + 'static,
        R: IntoExitCode,
    {
        let child = self.command.add_subcommand(Command::with_handler(name, handler));
        CommandBuilder::new(child)
    }

    /// Register a child namespace for further subcommands.
    pub fn group(&mut self, name: impl Into<String>) -> Group<'_> {
        let child = self
            .command
            .add_subcommand(Command::with_handler(name, |_, _| Ok(0)));
        CommandBuilder::new(child)
    }

    pub fn get(&self) -> &Command {
        self.command
    }
}
