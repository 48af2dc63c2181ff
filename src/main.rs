use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, IsTerminal, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hilite::cli::{Cli, ColorMode};
use hilite::config::Config;
use hilite::output::{self, Theme};
use hilite::{Completion, Error, Registry, Token, Tokenizer, message, registry};

/// Read buffer size for stdin and files.
const READ_BUFFER: usize = 64 * 1024;

fn main() -> ExitCode {
    // Reset SIGPIPE to default behavior so upstream writers get a clean
    // SIGPIPE signal instead of a BrokenPipeError when hilite exits early.
    reset_sigpipe();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("hilite: {e}");
            return ExitCode::from(1);
        }
    };

    let registry = match config.build_registry().and_then(registry::install) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("hilite: {e}");
            return ExitCode::from(1);
        }
    };

    if cli.list {
        return finish(list(registry));
    }

    let selection = match select(&cli, registry) {
        Ok(selection) => selection,
        Err(e) => {
            eprintln!("hilite: {e}");
            return ExitCode::from(1);
        }
    };

    let use_color = resolve_color_mode(config.color_mode);
    let theme = config.theme();
    finish(run(&cli, &config, registry, &selection, use_color, &theme))
}

/// What to do with the input.
enum Selection<'r> {
    Tokenizer(&'r Tokenizer),
    Message,
    Passthrough,
}

/// Pick a tokenizer: `--lexer`, then `--content-type`/`--http`, then the
/// file name. Anything unclaimed passes through.
fn select<'r>(cli: &Cli, registry: &'r Registry) -> Result<Selection<'r>, Error> {
    let tokenizer = if let Some(name) = &cli.lexer {
        let tokenizer = registry
            .lookup_by_name(name)
            .ok_or_else(|| Error::Config(format!("no tokenizer named '{name}' (see --list)")))?;
        Some(tokenizer)
    } else if cli.http {
        return Ok(Selection::Message);
    } else if let Some(content_type) = &cli.content_type {
        registry.lookup_by_media_type(content_type)?
    } else if let Some(path) = &cli.file {
        registry.lookup_by_filename(&path.to_string_lossy())
    } else {
        None
    };

    Ok(match tokenizer {
        Some(t) if t.name() == message::HEAD_TOKENIZER => Selection::Message,
        Some(t) => {
            debug!(tokenizer = t.name(), "selected tokenizer");
            Selection::Tokenizer(t)
        }
        None => Selection::Passthrough,
    })
}

fn run(
    cli: &Cli,
    config: &Config,
    registry: &Registry,
    selection: &Selection<'_>,
    use_color: bool,
    theme: &Theme,
) -> Result<(), Error> {
    let mut reader = open_input(cli)?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let options = config.tokenize_options();

    if matches!(selection, Selection::Passthrough) && !cli.debug {
        io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        return Ok(());
    }

    {
        let mut sink = |token: Token| -> Result<(), Error> {
            if cli.debug {
                output::render_debug(&token, &mut writer)?;
            } else {
                output::render_token(&token, theme, use_color, &mut writer)?;
            }
            Ok(())
        };

        match selection {
            Selection::Tokenizer(tokenizer) => {
                let completion = tokenizer.tokenize_with(&mut reader, &options, &mut sink)?;
                if let Completion::Halted { remainder } = completion {
                    let mut rest = Cursor::new(remainder.into_bytes()).chain(&mut reader);
                    message::passthrough(&mut rest, options.chunk_size, &mut sink)?;
                }
            }
            Selection::Message => {
                message::tokenize_message(registry, &mut reader, &options, &mut sink)?;
            }
            Selection::Passthrough => {
                message::passthrough(&mut reader, options.chunk_size, &mut sink)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

fn open_input(cli: &Cli) -> Result<Box<dyn BufRead + Send>, Error> {
    match &cli.file {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path).map_err(|e| {
                Error::Io(io::Error::new(
                    e.kind(),
                    format!("cannot open {}: {e}", path.display()),
                ))
            })?;
            Ok(Box::new(BufReader::with_capacity(READ_BUFFER, file)))
        }
        _ => Ok(Box::new(BufReader::with_capacity(READ_BUFFER, io::stdin()))),
    }
}

fn list(registry: &Registry) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for tokenizer in registry.iter() {
        let lexer = tokenizer.lexer();
        let filenames: Vec<&str> = lexer.filenames().iter().map(|g| g.as_str()).collect();
        writeln!(
            writer,
            "{:<8} {:<24} {}",
            tokenizer.name(),
            filenames.join(","),
            lexer.media_types().join(",")
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Map a run result to the process exit code.
fn finish(result: Result<(), Error>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e @ Error::Config(_)) => {
            eprintln!("hilite: {e}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("hilite: {e}");
            ExitCode::from(2)
        }
    }
}

/// Route `tracing` output to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hilite={level},warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn resolve_color_mode(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            let stdout = io::stdout();
            if !stdout.is_terminal() {
                return false;
            }
            if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
                return false;
            }
            if std::env::var("TERM").is_ok_and(|v| v == "dumb") {
                return false;
            }
            true
        }
    }
}

/// Reset SIGPIPE to the default (terminate) behavior.
///
/// By default, Rust ignores SIGPIPE to surface `BrokenPipe` I/O errors.
/// For a CLI filter like `hilite`, this causes the *upstream* writer to
/// receive a `BrokenPipeError` when `hilite` exits. Restoring `SIG_DFL`
/// lets the OS handle the signal normally.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}
