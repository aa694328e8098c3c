use clap::{Parser as ClapParser, Subcommand};
use miette::{IntoDiagnostic, NamedSource, Report, WrapErr};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use treelox::asth::Stmt;
use treelox::*;

/// exit code for lexical and syntax errors
const EXIT_DATA_ERR: i32 = 65;
/// exit code for runtime errors
const EXIT_SOFTWARE: i32 = 70;

/// type to help us parse the command line arguments
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// nested calls allowed before a run fails with a stack overflow
    #[arg(long, global = true, default_value_t = Config::DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

/// holds the Command types argument type
#[derive(Debug, Subcommand)]
enum Commands {
    /// prints every token of a file
    Tokenize { filename: PathBuf },
    /// prints the syntax tree of a file
    Parse { filename: PathBuf },
    /// runs a file
    Run { filename: PathBuf },
    /// reads statements from stdin line by line
    Repl,
}

/// Logs go to stderr and only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> miette::Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = Config::default().with_max_call_depth(args.max_call_depth);

    let code = match args.command {
        Commands::Tokenize { filename } => tokenize(&read_source(&filename)?),
        Commands::Parse { filename } => {
            let source = read_source(&filename)?;
            match front_end(&filename, &source) {
                Some(statements) => {
                    for stmt in statements {
                        println!("{stmt}");
                    }
                    0
                },
                None => EXIT_DATA_ERR,
            }
        },
        Commands::Run { filename } => {
            let source = read_source(&filename)?;
            match front_end(&filename, &source) {
                Some(statements) => {
                    let mut evaluator = Evaluator::new(config, Output::Stdout);
                    run(&mut evaluator, &filename, &source, &statements)
                },
                None => EXIT_DATA_ERR,
            }
        },
        Commands::Repl => repl(config)?,
    };

    std::process::exit(code)
}

fn read_source(filename: &Path) -> miette::Result<String> {
    fs::read_to_string(filename)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {} file failed!", filename.display()))
}

fn tokenize(source: &str) -> i32 {
    let mut erry = false;

    for token in Lexer::new(source) {
        match token {
            Ok(token) => println!("{token}"),
            Err(e) => {
                erry = true;
                eprintln!("{e:?}");
            },
        }
    }
    println!("EOF  null");

    if erry {
        EXIT_DATA_ERR
    } else {
        0
    }
}

/// Scans and parses, reporting every lexical and syntax error.
///
/// Returns `None` if there was any.
fn front_end(filename: &Path, source: &str) -> Option<Vec<Stmt>> {
    let (tokens, lex_errors) = scan(source);
    let (statements, parse_errors) = Parser::new(tokens).parse();

    for e in &lex_errors {
        eprintln!("{e:?}");
    }
    for e in &parse_errors {
        eprintln!("{:?}", with_source(filename, source, e.clone()));
    }

    (lex_errors.is_empty() && parse_errors.is_empty()).then_some(statements)
}

fn run(evaluator: &mut Evaluator, filename: &Path, source: &str, statements: &[Stmt]) -> i32 {
    match evaluator.interpret(statements) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{:?}", with_source(filename, source, e));
            EXIT_SOFTWARE
        },
    }
}

fn with_source(filename: &Path, source: &str, diagnostic: impl miette::Diagnostic + Send + Sync + 'static) -> Report {
    Report::new(diagnostic).with_source_code(NamedSource::new(filename.display().to_string(), source.to_string()))
}

fn repl(config: Config) -> miette::Result<i32> {
    let mut evaluator = Evaluator::new(config, Output::Stdout);
    let stdin = io::stdin();
    let name = PathBuf::from("<repl>");

    loop {
        print!("> ");
        io::stdout().flush().into_diagnostic()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).into_diagnostic()? == 0 {
            break;
        }

        if let Some(statements) = front_end(&name, &line) {
            // a runtime error only ends this line
            run(&mut evaluator, &name, &line, &statements);
        }
    }

    Ok(0)
}
