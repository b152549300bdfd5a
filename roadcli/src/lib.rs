//! # roadcli
//!
//! A declarative command-line framework: register a tree of named commands
//! with typed options and positional arguments, then hand it a token stream.
//! The parser resolves the deepest command named by the tokens, binds values
//! into a [`Context`], and the dispatcher runs that command's handler.
//!
//! ## Core Principles
//!
//! - **Single pass**: tokens are read left to right with one token of
//!   lookahead; subcommand names hand the rest of the stream to a child parser
//! - **Explicit registration**: every registration returns a [`CommandBuilder`]
//!   bound to its command, so options attach at any depth
//! - **Lenient by default**: unknown options are dropped and `required` is
//!   metadata; [`ParseMode::Strict`] turns both into errors
//! - **No globals**: output goes through the [`Console`] passed to each run
//!
//! ## Quick Start
//!
//! ```rust
//! use roadcli::{Cli, CliResult, Console, Context, Opt};
//! use std::io::Write;
//!
//! fn greet(ctx: &Context<'_>, console: &mut Console) -> CliResult<i32> {
//!     let name: String = ctx.get_or("name", "World".to_string());
//!     let count: i64 = ctx.get_or("count", 1);
//!     for _ in 0..count {
//!         writeln!(console, "Hello, {}!", name)?;
//!     }
//!     Ok(0)
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cli = Cli::new("myapp").version("1.0.0");
//!     cli.command("greet", greet)
//!         .about("Greet someone")
//!         .option(Opt::new("name").default("World"))?
//!         .option(Opt::new("count").integer().default(1))?;
//!
//!     let (mut console, captured) = Console::captured();
//!     let code = cli.run(["greet", "--count", "2"], &mut console);
//!
//!     assert_eq!(code, 0);
//!     assert_eq!(captured.stdout(), "Hello, World!\nHello, World!\n");
//!     Ok(())
//! }
//! ```

// Lets `#[derive(FromContext)]` expand to `::roadcli::...` inside this crate too.
extern crate self as roadcli;

pub mod cli;
pub mod command;
pub mod console;
pub mod context;
pub mod error;
pub mod help;
pub mod param;
pub mod parser;
pub mod value;

#[cfg(feature = "subscriber")]
pub mod tracing_support;

pub use cli::{Cli, CliConfig};
pub use command::{Command, CommandBuilder, Group, Handler, IntoExitCode};
pub use console::{Captured, Console};
pub use context::{Context, FromContext};
pub use error::{CliError, CliResult, DefinitionError, ParseError, SystemError, UserError};
pub use param::{Arg, Nargs, Opt};
pub use parser::{ParseMode, Parser};
pub use value::{FromValue, Value, ValueType};

pub use roadcli_macros::FromContext;

// Re-export tracing so handlers can log without a direct dependency.
pub use tracing;

#[cfg(feature = "subscriber")]
pub use tracing_support::{
    init_subscriber, init_subscriber_with_config, TracingConfig, TracingFormat,
};
