//! Registration and dispatch shell.

use crate::command::{Command, CommandBuilder, Group, IntoExitCode};
use crate::console::Console;
use crate::context::Context;
use crate::error::{CliError, CliResult, ParseError};
use crate::help;
use crate::parser::{ParseMode, Parser};
use crate::value::is_truthy;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, debug_span, warn};

/// Environment variable that switches the parser to strict mode.
pub const STRICT_ENV: &str = "ROADCLI_STRICT";

/// Application-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Printed by `--version` and in the root help header.
    pub version: String,

    /// Root help text.
    pub about: String,

    pub mode: ParseMode,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            about: String::new(),
            mode: ParseMode::Lenient,
        }
    }
}

impl CliConfig {
    /// Defaults, with `ROADCLI_STRICT` (boolean literal) selecting strict mode.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(STRICT_ENV) {
            if is_truthy(&value) {
                config.mode = ParseMode::Strict;
            }
        }
        config
    }
}

type BeforeHook = Box<dyn Fn(&[String]) -> CliResult<()> + Send + Sync>;
type AfterHook = Box<dyn Fn(&Context<'_>, i32) -> CliResult<()> + Send + Sync>;
type ErrorHook = Box<dyn Fn(&CliError) + Send + Sync>;

#[derive(Default)]
struct Hooks {
    before: Vec<BeforeHook>,
    after: Vec<AfterHook>,
    error: Vec<ErrorHook>,
}

/// Owns the root of the command tree and dispatches token streams to it.
///
/// The tree is only read during [`run`](Cli::run), so one `Cli` can serve any
/// number of invocations, including from several threads.
///
/// # Example
///
/// ```
/// use roadcli::{Cli, Console, Opt};
/// use std::io::Write;
///
/// let mut cli = Cli::new("myapp").version("1.0.0").about("My CLI application");
/// cli.command("greet", |ctx, console| {
///     let name: String = ctx.get_or("name", "World".to_string());
///     writeln!(console, "Hello, {}!", name)?;
///     Ok(0)
/// })
/// .about("Greet someone")
/// .option(Opt::new("name").short('n').default("World"))
/// .unwrap();
///
/// let (mut console, captured) = Console::captured();
/// assert_eq!(cli.run(["greet", "-n", "Ada"], &mut console), 0);
/// assert_eq!(captured.stdout(), "Hello, Ada!\n");
/// ```
pub struct Cli {
    config: CliConfig,
    root: Command,
    hooks: Hooks,
}

impl Cli {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CliConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: CliConfig) -> Self {
        let mut root = Command::new(name);
        CommandBuilder::new(&mut root).about(config.about.clone());
        Self {
            config,
            root,
            hooks: Hooks::default(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.config.about = about.into();
        CommandBuilder::new(&mut self.root).about(self.config.about.clone());
        self
    }

    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    /// Handle for declaring options and arguments on the root itself.
    pub fn root_mut(&mut self) -> CommandBuilder<'_> {
        CommandBuilder::new(&mut self.root)
    }

    /// Register a top-level command.
    pub fn command<F, R>(&mut self, name: impl Into<String>, handler: F) -> CommandBuilder<'_>
    where
        F: Fn(&Context<'_>, &mut Console) -> CliResult<R> + Send + Sync + 'static,
        R: IntoExitCode,
    {
        let command = self.root.add_subcommand(Command::with_handler(name, handler));
        CommandBuilder::new(command)
    }

    /// Register a top-level namespace whose own handler does nothing.
    pub fn group(&mut self, name: impl Into<String>) -> Group<'_> {
        let command = self
            .root
            .add_subcommand(Command::with_handler(name, |_, _| Ok(0)));
        CommandBuilder::new(command)
    }

    /// Called with the raw tokens before anything else happens.
    pub fn before<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&[String]) -> CliResult<()> + Send + Sync + 'static,
    {
        self.hooks.before.push(Box::new(hook));
        self
    }

    /// Called with the context and exit code after a handler returns.
    pub fn after<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Context<'_>, i32) -> CliResult<()> + Send + Sync + 'static,
    {
        self.hooks.after.push(Box::new(hook));
        self
    }

    /// Called with any error that reaches the dispatch boundary.
    pub fn on_error<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&CliError) + Send + Sync + 'static,
    {
        self.hooks.error.push(Box::new(hook));
        self
    }

    pub fn parser(&self) -> Parser<'_> {
        Parser::new(&self.root).mode(self.config.mode)
    }

    /// Parse without dispatching.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Context<'_>, ParseError> {
        self.parser().parse(tokens)
    }

    /// `"{name} {version}"`.
    pub fn version_line(&self) -> String {
        format!("{} {}", self.root.name(), self.config.version)
    }

    /// Help text for the command at `path` below the root.
    pub fn render_help(&self, console: &Console, path: &[&str]) -> Option<String> {
        let command = self.root.find(path.iter().copied())?;
        let mut full = vec![self.root.name()];
        full.extend_from_slice(path);
        Some(help::render(console, &self.config.version, command, &full))
    }

    /// Parse `tokens`, run the resolved handler and return the exit code.
    ///
    /// Every failure from hooks, parsing or the handler ends up here: error
    /// hooks fire, one `Error: ...` line goes to stderr and the error's exit
    /// code is returned.
    pub fn run<I, S>(&self, tokens: I, console: &mut Console) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let _span = debug_span!("run", cli = %self.root.name()).entered();

        match self.dispatch(&tokens, console) {
            Ok(code) => code,
            Err(err) => self.fail(err, console),
        }
    }

    /// Run against the process arguments and stdio.
    pub fn run_env(&self) -> i32 {
        let mut console = Console::stdio();
        self.run(std::env::args().skip(1), &mut console)
    }

    fn dispatch(&self, tokens: &[String], console: &mut Console) -> CliResult<i32> {
        for hook in &self.hooks.before {
            hook(tokens)?;
        }

        match tokens.first().map(String::as_str) {
            None | Some("-h" | "--help") => {
                let text = help::render(console, &self.config.version, &self.root, &[]);
                console.write_all(text.as_bytes())?;
                return Ok(0);
            }
            Some("-v" | "--version") => {
                writeln!(console, "{}", self.version_line())?;
                return Ok(0);
            }
            Some(_) => {}
        }

        let ctx = self.parser().parse(tokens)?;
        debug!(command = %ctx.path().join(" "), "Resolved command");

        let code = match ctx.command().handler() {
            Some(handler) => handler(&ctx, &mut *console)?,
            None => {
                let text = help::render(console, &self.config.version, ctx.command(), &ctx.path());
                console.write_all(text.as_bytes())?;
                0
            }
        };

        for hook in &self.hooks.after {
            hook(&ctx, code)?;
        }
        Ok(code)
    }

    fn fail(&self, err: CliError, console: &mut Console) -> i32 {
        for hook in &self.hooks.error {
            hook(&err);
        }
        debug!(error = %err, exit_code = err.exit_code(), "Invocation failed");
        if let Err(io) = console.error_line(&err) {
            warn!(error = %io, "Failed to write error diagnostic");
        }
        err.exit_code()
    }
}
