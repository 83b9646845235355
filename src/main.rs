use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use exprc::{
    compiler::compiler::generate, errors::errors::Error, lexer::lexer::tokenize,
    parser::parser::parse, render_error, type_checker::type_checker::analyze,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The token stream, one token per line
    Tokens,
    /// The parsed program
    Ast,
    /// The generated C translation unit
    C,
}

/// Compiles a source file to C.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source file to compile, stdin when omitted
    input: Option<PathBuf>,

    /// Write the output here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Emit::C)]
    emit: Emit,
}

fn main() -> Result<ExitCode> {
    init_tracing()?;
    execute(Cli::parse())
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exprc=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

fn execute(cli: Cli) -> Result<ExitCode> {
    let (source, file_name) = match &cli.input {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            (source, file_name)
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read source from stdin")?;
            (buffer, String::from("<stdin>"))
        }
    };

    let start = Instant::now();

    let (tokens, errors) = tokenize(&source, Some(file_name.clone()));
    info!("Tokenized in {:?}", start.elapsed());
    if !errors.is_empty() {
        return Ok(report(&errors, &source));
    }

    if cli.emit == Emit::Tokens {
        let listing = tokens
            .iter()
            .map(|token| format!("{}\n", token))
            .collect::<String>();
        write_output(cli.output.as_ref(), &listing)?;
        return Ok(ExitCode::SUCCESS);
    }

    let parse_start = Instant::now();
    let (program, errors) = parse(tokens, Arc::new(file_name));
    info!("Parsed in {:?}", parse_start.elapsed());
    if !errors.is_empty() {
        return Ok(report(&errors, &source));
    }

    if cli.emit == Emit::Ast {
        write_output(cli.output.as_ref(), &format!("{:#?}\n", program))?;
        return Ok(ExitCode::SUCCESS);
    }

    let analysis_start = Instant::now();
    let analysis = analyze(&program);
    info!("Analysed in {:?}", analysis_start.elapsed());
    if !analysis.errors.is_empty() {
        return Ok(report(&analysis.errors, &source));
    }

    let generate_start = Instant::now();
    let output = generate(&program, &analysis);
    info!("Generated C in {:?}", generate_start.elapsed());
    info!("Total time: {:?}", start.elapsed());

    write_output(cli.output.as_ref(), &output)?;
    Ok(ExitCode::SUCCESS)
}

fn report(errors: &[Error], source: &str) -> ExitCode {
    for error in errors {
        eprintln!("{}", render_error(error, source));
    }
    ExitCode::FAILURE
}

fn write_output(path: Option<&PathBuf>, contents: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, contents)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .context("failed to write to stdout")?;
            stdout.flush().context("failed to flush stdout")
        }
    }
}
