//! Single-pass token parser.
//!
//! Tokens are read left to right with one token of lookahead and no
//! backtracking:
//!
//! - `--key=value` / `--key value`: long option. Without `=` the next token is
//!   always consumed as the value, even if it looks like an option or a
//!   subcommand.
//! - `-k value`: short option (exactly one dash and one character).
//! - a bare token naming a subcommand hands the rest of the stream to a child
//!   parser, whose context becomes the result.
//! - any other bare token binds to the next positional argument; a variadic
//!   argument keeps absorbing tokens until the stream ends.
//!
//! Unknown options and surplus positionals are dropped and `required` is not
//! checked unless the parser runs in [`ParseMode::Strict`].

use crate::command::Command;
use crate::context::Context;
use crate::error::ParseError;
use crate::param::{Arg, Nargs, Opt};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// How tolerant the parser is of input it cannot place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Ignore unknown options and surplus positionals; `required` is metadata only.
    #[default]
    Lenient,
    /// Reject unknown options, surplus positionals, value-less options and
    /// missing required options/arguments.
    Strict,
}

/// Parses a token stream against one [`Command`].
#[derive(Debug, Clone, Copy)]
pub struct Parser<'cmd> {
    command: &'cmd Command,
    mode: ParseMode,
}

impl<'cmd> Parser<'cmd> {
    pub fn new(command: &'cmd Command) -> Self {
        Self {
            command,
            mode: ParseMode::default(),
        }
    }

    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parse `tokens`, returning the context of the deepest command reached.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Context<'cmd>, ParseError> {
        self.parse_level(tokens, None)
    }

    fn parse_level<S: AsRef<str>>(
        &self,
        tokens: &[S],
        parent: Option<Box<Context<'cmd>>>,
    ) -> Result<Context<'cmd>, ParseError> {
        let mut ctx = Context::new(self.command, parent);
        let mut variadic: Vec<Value> = Vec::new();
        let mut position = 0;
        let mut cursor = 0;

        while cursor < tokens.len() {
            let token = tokens[cursor].as_ref();
            trace!(command = %self.command.name(), token, "Scanning token");

            if let Some(body) = token.strip_prefix("--") {
                let (key, value) = match body.split_once('=') {
                    Some((key, value)) => (key, Some(value)),
                    None => {
                        cursor += 1;
                        (body, tokens.get(cursor).map(|t| t.as_ref()))
                    }
                };
                match self.command.find_option(key) {
                    Some(opt) => self.store_option(&mut ctx, opt, value)?,
                    None => self.unknown_option(token)?,
                }
            } else if let Some(short) = short_flag(token) {
                match self.command.find_short(short) {
                    Some(opt) => {
                        cursor += 1;
                        let value = tokens.get(cursor).map(|t| t.as_ref());
                        self.store_option(&mut ctx, opt, value)?;
                    }
                    // The following token is left for positional binding.
                    None => self.unknown_option(token)?,
                }
            } else if let Some(child) = self.command.subcommand(token) {
                self.finish(&mut ctx, variadic, false)?;
                debug!(
                    parent = %self.command.name(),
                    command = %child.name(),
                    remaining = tokens.len() - cursor - 1,
                    "Delegating to subcommand"
                );
                let parser = Parser {
                    command: child,
                    mode: self.mode,
                };
                return parser.parse_level(&tokens[cursor + 1..], Some(Box::new(ctx)));
            } else {
                self.bind_positional(&mut ctx, &mut position, &mut variadic, token)?;
            }

            cursor += 1;
        }

        self.finish(&mut ctx, variadic, true)?;
        Ok(ctx)
    }

    fn store_option(
        &self,
        ctx: &mut Context<'cmd>,
        opt: &Opt,
        token: Option<&str>,
    ) -> Result<(), ParseError> {
        let value = match token {
            Some(token) => opt.value_type.coerce(token, &opt.name)?,
            None if self.mode == ParseMode::Strict => {
                return Err(ParseError::MissingValue(opt.name.clone()));
            }
            None => Value::Null,
        };

        if opt.multiple {
            let slot = ctx
                .options
                .entry(opt.name.clone())
                .or_insert_with(|| Value::List(Vec::new()));
            if let Value::List(items) = slot {
                items.push(value);
            }
        } else {
            ctx.options.insert(opt.name.clone(), value);
        }
        Ok(())
    }

    fn unknown_option(&self, token: &str) -> Result<(), ParseError> {
        if self.mode == ParseMode::Strict {
            return Err(ParseError::UnknownOption(token.to_string()));
        }
        debug!(command = %self.command.name(), option = token, "Ignoring unknown option");
        Ok(())
    }

    fn bind_positional(
        &self,
        ctx: &mut Context<'cmd>,
        position: &mut usize,
        variadic: &mut Vec<Value>,
        token: &str,
    ) -> Result<(), ParseError> {
        match self.command.arguments().get(*position) {
            Some(arg) if arg.nargs.is_variadic() => {
                variadic.push(arg.value_type.coerce(token, &arg.name)?);
            }
            Some(arg) => {
                let value = arg.value_type.coerce(token, &arg.name)?;
                ctx.arguments.insert(arg.name.clone(), value);
                *position += 1;
            }
            None if self.mode == ParseMode::Strict => {
                return Err(ParseError::UnexpectedArgument(token.to_string()));
            }
            None => {
                debug!(command = %self.command.name(), token, "Discarding surplus positional");
            }
        }
        Ok(())
    }

    /// Close out one level: store collected variadic values, check required
    /// descriptors (strict mode), then fill defaults.
    ///
    /// `terminal` is false when the level is about to delegate; its positional
    /// arguments can no longer be filled, so they are not checked.
    fn finish(
        &self,
        ctx: &mut Context<'cmd>,
        variadic: Vec<Value>,
        terminal: bool,
    ) -> Result<(), ParseError> {
        if !variadic.is_empty() {
            if let Some(arg) = self.command.variadic() {
                ctx.arguments.insert(arg.name.clone(), Value::List(variadic));
            }
        }

        if self.mode == ParseMode::Strict {
            for opt in self.command.options() {
                if opt.required && opt.default.is_null() && !ctx.options.contains_key(&opt.name) {
                    return Err(ParseError::MissingOption(opt.name.clone()));
                }
            }
            if terminal {
                for arg in self.command.arguments() {
                    if missing_argument(ctx, arg) {
                        return Err(ParseError::MissingArgument(arg.name.clone()));
                    }
                }
            }
        }

        for opt in self.command.options() {
            ctx.options
                .entry(opt.name.clone())
                .or_insert_with(|| opt.default.clone());
        }
        for arg in self.command.arguments() {
            ctx.arguments
                .entry(arg.name.clone())
                .or_insert_with(|| arg.default.clone());
        }
        Ok(())
    }
}

fn missing_argument(ctx: &Context<'_>, arg: &Arg) -> bool {
    if ctx.arguments.contains_key(&arg.name) {
        return false;
    }
    match arg.nargs {
        Nargs::OneOrMore => true,
        Nargs::One => arg.required && arg.default.is_null(),
        Nargs::Optional | Nargs::ZeroOrMore => false,
    }
}

/// `-x` with exactly one dash and one character.
fn short_flag(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(short), None) => Some(short),
        _ => None,
    }
}
