//! Purpose: `partstore` console entry point.
//! Role: Binary crate root; parses args, sets up logging, runs the menu session.
//! Invariants: Menu output goes to stdout; logs and fatal errors go to stderr.
//! Invariants: Non-interactive fatal errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use partstore::api::{Error, ErrorKind, RecordStore, StoreOptions, to_exit_code};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod console;
mod render;

use console::{Session, SessionConfig};
use render::RecordFormat;

#[derive(Parser)]
#[command(
    name = "partstore",
    version,
    about = "In-memory part record store with a menu-driven console",
    long_about = None,
    after_help = r#"EXAMPLES
  $ partstore
  $ partstore --format json --max-bytes 760
  $ printf '4\n111\nBolt\n5.0\nmm\n0.25\n1\n6\n' | partstore --quiet
  $ partstore --input session.txt

Records live only for the lifetime of the process.
Set RUST_LOG=debug to trace storage growth on stderr."#
)]
struct Cli {
    #[arg(
        long,
        value_enum,
        default_value = "human",
        help = "How option 1 prints records: human|json"
    )]
    format: RecordFormat,
    #[arg(
        long,
        env = "PARTSTORE_MAX_BYTES",
        value_name = "BYTES",
        help = "Byte budget for record storage (default: unlimited)"
    )]
    max_bytes: Option<usize>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Read menu input from a file instead of stdin",
        value_hint = ValueHint::FilePath
    )]
    input: Option<PathBuf>,
    #[arg(long, help = "Do not print the menu before each prompt")]
    quiet: bool,
    #[arg(
        long,
        value_enum,
        value_name = "SHELL",
        help = "Print a shell completion script and exit"
    )]
    completions: Option<Shell>,
}

fn main() {
    let exit_code = match run() {
        Ok(()) => 0,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                return Ok(());
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `partstore --help`."));
            }
        },
    };

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::aot::generate(shell, &mut cmd, "partstore", &mut io::stdout());
        return Ok(());
    }

    init_tracing();

    let options = match cli.max_bytes {
        Some(max_bytes) => StoreOptions::new().with_max_bytes(max_bytes),
        None => StoreOptions::new(),
    };
    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("cannot open input file {}", path.display()))
                    .with_hint("Check the --input path.")
                    .with_source(err)
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    let config = SessionConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let mut session = Session::new(
        input,
        io::stdout().lock(),
        RecordStore::with_options(options),
        config,
    );
    session.run()
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Alloc => "allocation failed".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(count) = err.count() {
        inner.insert("count".to_string(), json!(count));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
