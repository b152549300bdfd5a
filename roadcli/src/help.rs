//! Help text rendering.

use crate::command::Command;
use crate::console::Console;
use crate::param::{Arg, Nargs, Opt};
use anstyle::Style;

const HEADING: Style = Style::new().bold().underline();
const LITERAL: Style = Style::new().bold();

/// Render help for `command`, reached through `path` (root name first).
///
/// The root level also lists the built-in `-h/--help` and `-v/--version` flags.
pub fn render(console: &Console, version: &str, command: &Command, path: &[&str]) -> String {
    let is_root = path.len() <= 1;
    let mut lines = Vec::new();

    if is_root {
        lines.push(format!("{} {}", command.name(), version));
    } else {
        lines.push(path.join(" "));
    }
    if !command.help().is_empty() {
        lines.push(String::new());
        lines.push(command.help().to_string());
    }

    lines.push(String::new());
    lines.push(format!(
        "{} {}",
        console.paint(HEADING, "Usage:"),
        usage(command, path)
    ));

    if !command.arguments().is_empty() {
        lines.push(String::new());
        lines.push(console.paint(HEADING, "Arguments:"));
        for arg in command.arguments() {
            lines.push(row(console, &arg.name, &describe_argument(arg)));
        }
    }

    if command.has_subcommands() {
        lines.push(String::new());
        lines.push(console.paint(HEADING, "Commands:"));
        for child in command.subcommands() {
            lines.push(format!(
                "  {} {}",
                console.paint(LITERAL, &format!("{:15}", child.name())),
                child.help()
            ));
        }
    }

    if !command.options().is_empty() || is_root {
        lines.push(String::new());
        lines.push(console.paint(HEADING, "Options:"));
        for opt in command.options() {
            lines.push(row(console, &option_label(opt), &describe_option(opt)));
        }
        if is_root {
            lines.push(row(console, "-h, --help", "Show this help message"));
            lines.push(row(console, "-v, --version", "Show version"));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn usage(command: &Command, path: &[&str]) -> String {
    let mut parts: Vec<String> = if path.is_empty() {
        vec![command.name().to_string()]
    } else {
        path.iter().map(|s| s.to_string()).collect()
    };
    if !command.options().is_empty() {
        parts.push("[OPTIONS]".to_string());
    }
    for arg in command.arguments() {
        parts.push(match arg.nargs {
            Nargs::One if arg.required => format!("<{}>", arg.name),
            Nargs::One | Nargs::Optional => format!("[{}]", arg.name),
            Nargs::ZeroOrMore => format!("[{}]...", arg.name),
            Nargs::OneOrMore => format!("<{}>...", arg.name),
        });
    }
    if command.has_subcommands() {
        parts.push("<COMMAND>".to_string());
    }
    parts.join(" ")
}

fn row(console: &Console, label: &str, help: &str) -> String {
    let padded = format!("{:15}", label);
    if help.is_empty() {
        format!("  {}", console.paint(LITERAL, padded.trim_end()))
    } else {
        format!("  {} {}", console.paint(LITERAL, &padded), help)
    }
}

fn option_label(opt: &Opt) -> String {
    match opt.short {
        Some(short) => format!("-{}, --{}", short, opt.name),
        None => format!("    --{}", opt.name),
    }
}

fn describe_option(opt: &Opt) -> String {
    let mut notes = vec![opt.value_type.to_string()];
    if !opt.default.is_null() {
        notes.push(format!("default: {}", opt.default));
    }
    if opt.required {
        notes.push("required".to_string());
    }
    if opt.multiple {
        notes.push("repeatable".to_string());
    }
    join_help(&opt.help, &notes)
}

fn describe_argument(arg: &Arg) -> String {
    let mut notes = vec![arg.value_type.to_string()];
    if !arg.default.is_null() {
        notes.push(format!("default: {}", arg.default));
    }
    join_help(&arg.help, &notes)
}

fn join_help(help: &str, notes: &[String]) -> String {
    let notes = format!("[{}]", notes.join(", "));
    if help.is_empty() {
        notes
    } else {
        format!("{} {}", help, notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{Arg, Opt};

    fn plain() -> Console {
        Console::captured().0
    }

    #[test]
    fn test_root_layout() {
        let mut root = Command::new("myapp");
        root.add_subcommand(Command::new("greet"));
        let text = render(&plain(), "1.0.0", &root, &["myapp"]);

        assert!(text.starts_with("myapp 1.0.0\n"));
        assert!(text.contains("Commands:\n  greet           \n"));
        assert!(text.contains("  -h, --help      Show this help message\n"));
        assert!(text.contains("  -v, --version   Show version\n"));
    }

    #[test]
    fn test_nested_usage_and_options() {
        let mut cmd = Command::new("migrate");
        cmd.add_option(Opt::new("steps").short('s').integer().default(1).help("How many"))
            .unwrap();
        cmd.add_argument(Arg::new("target").nargs(Nargs::Optional))
            .unwrap();
        let text = render(&plain(), "1.0.0", &cmd, &["myapp", "db", "migrate"]);

        assert!(text.starts_with("myapp db migrate\n"));
        assert!(text.contains("Usage: myapp db migrate [OPTIONS] [target]\n"));
        assert!(text.contains("-s, --steps     How many [integer, default: 1]"));
        assert!(!text.contains("--version"));
    }
}
