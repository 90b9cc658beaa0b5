use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use tildemark_engine::{Converter, DEFAULT_MAX_DEPTH};

/// Convert markup text to an HTML fragment.
#[derive(Parser, Debug)]
#[command(name = "tildemark", version, about)]
struct Args {
    /// Input file; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Output file; writes stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum nested block depth before conversion fails.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = read_input(args.input.as_deref())?;
    debug!("read {} bytes of input", source.len());

    let converter = Converter::with_max_depth(args.max_depth);
    let html = converter.convert(&source).context("conversion failed")?;

    write_output(args.output.as_deref(), &html)?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, html: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, html.as_bytes())
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}
