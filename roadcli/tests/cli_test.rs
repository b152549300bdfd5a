//! Dispatch, hooks and the error boundary.

use roadcli::{Arg, Cli, CliConfig, CliError, Console, Context, Nargs, Opt, ParseMode, UserError};
use std::io::Write;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn greet(ctx: &Context<'_>, console: &mut Console) -> roadcli::CliResult<i32> {
    let name: String = ctx.get_or("name", "World".to_string());
    let count: i64 = ctx.get_or("count", 1);
    for _ in 0..count {
        writeln!(console, "Hello, {}!", name)?;
    }
    Ok(0)
}

fn app() -> Cli {
    let mut cli = Cli::new("myapp").version("1.0.0").about("My CLI application");
    cli.command("greet", greet)
        .about("Greet someone")
        .option(Opt::new("name").default("World"))
        .unwrap()
        .option(Opt::new("count").integer().default(1))
        .unwrap();
    cli.command("calc", |ctx, console| {
        let a: i64 = ctx.get_or("a", 0);
        let b: i64 = ctx.get_or("b", 0);
        match ctx.get::<String>("operation").as_deref() {
            Some("add") => writeln!(console, "{} + {} = {}", a, b, a + b)?,
            Some("sub") => writeln!(console, "{} - {} = {}", a, b, a - b)?,
            other => {
                return Err(CliError::User(UserError::InvalidArgument {
                    arg: "operation".into(),
                    reason: format!("unsupported operation {:?}", other),
                }))
            }
        }
        Ok(None::<i32>)
    })
    .about("Calculator")
    .argument(Arg::new("operation"))
    .unwrap()
    .argument(Arg::new("a").integer().default(0))
    .unwrap()
    .argument(Arg::new("b").integer().default(0))
    .unwrap();
    cli.command("exit", |ctx, _| Ok(ctx.get_or("code", 0i64) as i32))
        .argument(Arg::new("code").integer())
        .unwrap();
    cli.command("crash", |_, _| -> roadcli::CliResult<()> {
        Err(CliError::system("disk on fire"))
    });
    let mut db = cli.group("db");
    db.about("Database commands");
    db.command("migrate", |_, console| {
        writeln!(console, "Running migrations...")?;
        Ok(())
    })
    .about("Run migrations");
    cli
}

fn recording_hooks(cli: &mut Cli) -> Log {
    let log: Log = Arc::default();
    let before = Arc::clone(&log);
    let after = Arc::clone(&log);
    let error = Arc::clone(&log);
    cli.before(move |tokens| {
        before.lock().unwrap().push(format!("before {}", tokens.join(" ")));
        Ok(())
    })
    .after(move |ctx, code| {
        after
            .lock()
            .unwrap()
            .push(format!("after {} {}", ctx.command().name(), code));
        Ok(())
    })
    .on_error(move |err| {
        error.lock().unwrap().push(format!("error {}", err));
    });
    log
}

#[test]
fn test_greet_defaults_and_overrides() {
    let cli = app();

    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["greet"], &mut console), 0);
    assert_eq!(captured.stdout(), "Hello, World!\n");

    let (mut console, captured) = Console::captured();
    let code = cli.run(["greet", "--name", "Ada", "--count", "3"], &mut console);
    assert_eq!(code, 0);
    assert_eq!(captured.stdout(), "Hello, Ada!\n".repeat(3));
}

#[test]
fn test_positional_calc() {
    let cli = app();
    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["calc", "add", "2", "5"], &mut console), 0);
    assert_eq!(captured.stdout(), "2 + 5 = 7\n");
}

#[test]
fn test_group_dispatches_to_child() {
    let cli = app();
    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["db", "migrate"], &mut console), 0);
    assert_eq!(captured.stdout(), "Running migrations...\n");
}

#[test]
fn test_group_itself_is_a_noop() {
    let cli = app();
    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["db"], &mut console), 0);
    assert_eq!(captured.stdout(), "");
}

#[test]
fn test_integer_return_is_exit_code() {
    let cli = app();
    let (mut console, _) = Console::captured();
    assert_eq!(cli.run(["exit", "7"], &mut console), 7);
}

#[test]
fn test_help_and_version_short_circuit() {
    let mut cli = app();
    let log = recording_hooks(&mut cli);

    for tokens in [vec![], vec!["-h"], vec!["--help", "greet"]] {
        let (mut console, captured) = Console::captured();
        assert_eq!(cli.run(tokens, &mut console), 0);
        let out = captured.stdout();
        assert!(out.starts_with("myapp 1.0.0\n\nMy CLI application\n"), "{}", out);
        assert!(out.contains("  greet           Greet someone\n"));
        assert!(out.contains("  db              Database commands\n"));
    }

    for flag in ["-v", "--version"] {
        let (mut console, captured) = Console::captured();
        assert_eq!(cli.run([flag], &mut console), 0);
        assert_eq!(captured.stdout(), "myapp 1.0.0\n");
    }

    // Before hooks still fire; after/error hooks do not.
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 5);
    assert!(log.iter().all(|entry| entry.starts_with("before")));
}

#[test]
fn test_root_without_command_renders_help() {
    let cli = app();
    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["--name", "x"], &mut console), 0);
    assert!(captured.stdout().starts_with("myapp 1.0.0\n"));
}

#[test]
fn test_hooks_fire_in_order() {
    let mut cli = app();
    let log = recording_hooks(&mut cli);

    let (mut console, _) = Console::captured();
    assert_eq!(cli.run(["exit", "3"], &mut console), 3);

    assert_eq!(
        *log.lock().unwrap(),
        vec!["before exit 3".to_string(), "after exit 3".to_string()]
    );
}

#[test]
fn test_handler_error_reaches_boundary() {
    let mut cli = app();
    let log = recording_hooks(&mut cli);

    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["crash"], &mut console), 101);
    assert_eq!(captured.stderr(), "Error: internal error: disk on fire\n");
    assert_eq!(captured.stdout(), "");

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1], "error internal error: disk on fire");
}

#[test]
fn test_user_error_exits_one() {
    let cli = app();
    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["calc", "mul", "1", "2"], &mut console), 1);
    assert!(captured
        .stderr()
        .starts_with("Error: invalid argument 'operation'"));
}

#[test]
fn test_conversion_error_reaches_boundary() {
    let mut cli = app();
    let log = recording_hooks(&mut cli);

    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["greet", "--count", "lots"], &mut console), 1);
    assert_eq!(
        captured.stderr(),
        "Error: invalid value 'lots' for 'count': expected integer\n"
    );
    assert!(log.lock().unwrap().iter().all(|e| !e.starts_with("after")));
}

#[test]
fn test_failing_before_hook_aborts_dispatch() {
    let mut cli = app();
    let errors = Arc::new(Mutex::new(0));
    let seen = Arc::clone(&errors);
    cli.before(|_| Err(CliError::user("not logged in")))
        .on_error(move |_| *seen.lock().unwrap() += 1);

    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["greet"], &mut console), 1);
    assert_eq!(captured.stdout(), "");
    assert_eq!(captured.stderr(), "Error: not logged in\n");
    assert_eq!(*errors.lock().unwrap(), 1);
}

#[test]
fn test_failing_after_hook_is_reported() {
    let mut cli = app();
    cli.after(|_, _| Err(CliError::system("audit log unavailable")));

    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["greet"], &mut console), 101);
    assert_eq!(captured.stdout(), "Hello, World!\n");
    assert!(captured.stderr().contains("audit log unavailable"));
}

#[test]
fn test_strict_mode_from_config() {
    let config = CliConfig {
        mode: ParseMode::Strict,
        ..CliConfig::default()
    };
    let mut cli = Cli::with_config("road", config);
    cli.command("deploy", |_, _| Ok(0))
        .option(Opt::new("env").short('e').required(true))
        .unwrap()
        .argument(Arg::new("services").nargs(Nargs::OneOrMore))
        .unwrap();

    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["deploy", "api"], &mut console), 1);
    assert_eq!(captured.stderr(), "Error: missing required option '--env'\n");

    let (mut console, _) = Console::captured();
    assert_eq!(cli.run(["deploy", "-e", "prod", "api", "web"], &mut console), 0);

    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["deploy", "-e", "prod", "--force", "x", "api"], &mut console), 1);
    assert_eq!(captured.stderr(), "Error: unknown option '--force'\n");
}

#[test]
fn test_lenient_mode_ignores_unknown_and_required() {
    let mut cli = Cli::new("road");
    cli.command("deploy", |ctx, console| {
        writeln!(console, "{}", ctx.to_json())?;
        Ok(0)
    })
    .option(Opt::new("env").required(true))
    .unwrap();

    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["deploy", "--force", "yes"], &mut console), 0);
    let json: serde_json::Value = serde_json::from_str(captured.stdout().trim()).unwrap();
    assert_eq!(json["command"], "deploy");
    assert_eq!(json["options"]["env"], serde_json::Value::Null);
}

#[test]
fn test_one_cli_serves_many_threads() {
    let cli = app();
    std::thread::scope(|scope| {
        for n in 1..=4 {
            let cli = &cli;
            scope.spawn(move || {
                let (mut console, captured) = Console::captured();
                let count = n.to_string();
                assert_eq!(cli.run(["greet", "--count", count.as_str()], &mut console), 0);
                assert_eq!(captured.stdout().lines().count(), n);
            });
        }
    });
}

#[test]
fn test_diagnostic_stays_on_one_line() {
    let cli = app();
    let (mut console, captured) = Console::captured();
    assert_eq!(cli.run(["greet", "--count", "1\n2"], &mut console), 1);
    assert_eq!(
        captured.stderr(),
        "Error: invalid value '1\\n2' for 'count': expected integer\n"
    );
    assert_eq!(captured.stderr().lines().count(), 1);
}
