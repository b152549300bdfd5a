//! A small application built on roadcli.
//!
//! ```text
//! cargo run -p roadcli --example myapp -- greet --name Ada --count 2
//! cargo run -p roadcli --example myapp -- calc mul 6 7
//! cargo run -p roadcli --example myapp -- db migrate --steps 3
//! RUST_LOG=debug cargo run -p roadcli --example myapp -- greet --bogus x
//! ```

use roadcli::{Arg, Cli, CliConfig, CliError, CliResult, Console, Context, FromContext, Opt};
use std::io::Write;

#[derive(FromContext)]
struct CalcArgs {
    operation: String,
    a: f64,
    b: f64,
}

fn greet(ctx: &Context<'_>, console: &mut Console) -> CliResult<i32> {
    let name: String = ctx.get_or("name", "World".to_string());
    let count: i64 = ctx.get_or("count", 1);
    for _ in 0..count {
        writeln!(console, "Hello, {}!", name)?;
    }
    Ok(0)
}

fn calc(ctx: &Context<'_>, console: &mut Console) -> CliResult<()> {
    let args: CalcArgs = ctx.extract()?;
    let result = match args.operation.as_str() {
        "add" => args.a + args.b,
        "sub" => args.a - args.b,
        "mul" => args.a * args.b,
        "div" if args.b == 0.0 => return Err(CliError::user("division by zero")),
        "div" => args.a / args.b,
        other => return Err(CliError::user(format!("unknown operation '{}'", other))),
    };
    writeln!(console, "{}", result)?;
    Ok(())
}

fn build() -> Result<Cli, roadcli::DefinitionError> {
    let config = CliConfig {
        version: env!("CARGO_PKG_VERSION").to_string(),
        about: "My CLI application".to_string(),
        ..CliConfig::from_env()
    };
    let mut cli = Cli::with_config("myapp", config);

    cli.command("greet", greet)
        .about("Greet someone")
        .option(Opt::new("name").short('n').default("World").help("Who to greet"))?
        .option(Opt::new("count").short('c').integer().default(1).help("Repetitions"))?;

    cli.command("calc", calc)
        .about("Simple calculator")
        .argument(Arg::new("operation").help("add, sub, mul or div"))?
        .argument(Arg::new("a").float().default(0.0))?
        .argument(Arg::new("b").float().default(0.0))?;

    let mut db = cli.group("db");
    db.about("Database commands");
    db.command("migrate", |ctx, console| {
        let steps: i64 = ctx.get_or("steps", 1);
        writeln!(console, "Running {} migration(s)...", steps)?;
        Ok(())
    })
    .about("Run migrations")
    .option(Opt::new("steps").integer().default(1))?;

    cli.after(|ctx, code| {
        roadcli::tracing::debug!(command = %ctx.path().join(" "), code, "Finished");
        Ok(())
    });

    Ok(cli)
}

fn main() {
    let _ = roadcli::init_subscriber();

    let cli = match build() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(101);
        }
    };
    std::process::exit(cli.run_env());
}
