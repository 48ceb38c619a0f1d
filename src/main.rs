use std::{
    fs::read_to_string,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process,
    rc::Rc,
    time::Instant,
};

use cirrus::{
    ast::ast::Program,
    check_source, display_error,
    errors::errors::Error,
    lexer::{lexer::tokenize, tokens::Token},
    parser::parser::parse,
    semantic::analyzer::analyze,
};
use clap::{Parser as ClapParser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

const BANNER: &str = "Cirrus REPL v0.1.0";
const PROMPT: &str = "cirrus >> ";

#[derive(ClapParser)]
#[command(name = "cirrus", version, about = "Front end for the Cirrus language")]
struct Cli {
    /// Log pipeline phases and analyzer scopes to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize, parse and analyze a file
    Check { file: PathBuf },
    /// Check a file, then print its AST
    Ast { file: PathBuf },
    /// Print the token stream of a file
    Tokens { file: PathBuf },
    /// Read statements line by line
    Repl,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,cirrus=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Repl) {
        Commands::Check { file } => cmd_check(&file).map(|_| println!("ok")),
        Commands::Ast { file } => cmd_check(&file).map(|program| println!("{:#?}", program)),
        Commands::Tokens { file } => cmd_tokens(&file),
        Commands::Repl => repl(),
    };

    if let Err(message) = result {
        if !message.is_empty() {
            eprintln!("{}", message);
        }
        process::exit(1);
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    read_to_string(path).map_err(|e| format!("Cannot open file '{}': {}", path.display(), e))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runs the pipeline one phase at a time so each can be timed.
fn run_pipeline(source: &str, file: String) -> Result<Program, Error> {
    let start = Instant::now();

    let tokens = tokenize(source.to_string(), Some(file.clone()))?;
    info!(tokens = tokens.len(), elapsed = ?start.elapsed(), "tokenized");

    let parse_start = Instant::now();
    let (_, program) = parse(tokens, Rc::new(file));
    let program = program?;
    info!(statements = program.body.len(), elapsed = ?parse_start.elapsed(), "parsed");

    let analyze_start = Instant::now();
    analyze(&program)?;
    info!(elapsed = ?analyze_start.elapsed(), "analyzed");

    info!(elapsed = ?start.elapsed(), "checked");
    Ok(program)
}

/// Diagnostics are rendered here, so the returned message is empty.
fn cmd_check(path: &Path) -> Result<Program, String> {
    let source = read_file(path)?;

    run_pipeline(&source, file_name(path)).map_err(|error| {
        display_error(&error, &source);
        String::new()
    })
}

fn cmd_tokens(path: &Path) -> Result<(), String> {
    let source = read_file(path)?;

    let tokens: Vec<Token> = tokenize(source.clone(), Some(file_name(path))).map_err(|error| {
        display_error(&error, &source);
        String::new()
    })?;

    for token in tokens {
        println!("{}", token);
    }

    Ok(())
}

fn repl() -> Result<(), String> {
    println!("{}", BANNER);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", PROMPT);
        io::stdout().flush().map_err(|e| e.to_string())?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => return Err(e.to_string()),
            None => return Ok(()),
        };

        let line = line.trim();
        if line.is_empty() || line == "exit" {
            return Ok(());
        }

        match check_source(line.to_string(), None) {
            Ok(_) => println!("ok"),
            Err(error) => {
                debug!(error = error.get_error_name(), "line rejected");
                display_error(&error, line);
            }
        }
    }
}
