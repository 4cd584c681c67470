use brittle::{Context, Engine};

use clap::Parser;
use yansi::Paint;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Render a template file.
#[derive(Parser, Debug)]
#[command(name = "brittle", version)]
struct Args {
    /// Template to render.
    input: PathBuf,

    /// Where to write the result. Defaults to stdout.
    output: Option<PathBuf>,

    /// Extra `key=value` pairs, visible to fragments as `context.key`.
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_pair)]
    context: Vec<(String, String)>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let filepath = args.input.display().to_string();
    let contents = match fs::read_to_string(&args.input) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("{} cannot read {filepath}: {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let context: Context = args.context.into_iter().collect();
    let output = match Engine::new().render_with(&contents, context) {
        Ok(output) => output,
        Err(error) => {
            if error.eprint(&filepath, &contents).is_err() {
                eprintln!("{} {error}", "error:".red().bold());
            }
            return ExitCode::FAILURE;
        }
    };

    match args.output {
        Some(path) => {
            if let Err(e) = fs::write(&path, output) {
                eprintln!(
                    "{} cannot write {}: {e}",
                    "error:".red().bold(),
                    path.display()
                );
                return ExitCode::FAILURE;
            }
        }
        None => print!("{output}"),
    }

    ExitCode::SUCCESS
}
