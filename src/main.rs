//! markover - rewrite the visible text of HTML fragments

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::executor::block_on;
use tracing_subscriber::EnvFilter;

use markover::dom::ArenaDom;
use markover::{MarkOverOptions, MatchPolicy, SkipTags, TreeEngine, mark_over, sync_transform, text};

#[derive(Parser)]
#[command(name = "markover")]
#[command(version, about = "Rewrite the visible text of HTML fragments", long_about = None)]
#[command(after_help = "EXAMPLES:
    markover extract page.html                 List text fragments as JSON
    markover apply page.html --map fr.json     Replace text using a JSON map
    markover case page.html --to upper -s PRE  Upper-case all text outside <pre>")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the collected text fragments as JSON
    Extract {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Replace text using a JSON object mapping source text to replacement
    Apply {
        #[command(flatten)]
        input: InputArgs,

        /// JSON file of the form {"source text": "replacement"}
        #[arg(short, long, value_name = "FILE")]
        map: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Change the letter case of every fragment
    Case {
        #[command(flatten)]
        input: InputArgs,

        /// Target case
        #[arg(long, value_enum)]
        to: Letters,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input HTML fragment, or `-` for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: PathBuf,

    /// Extra tag name to leave untouched, as the DOM reports it (e.g. PRE)
    #[arg(short, long = "skip", value_name = "TAG")]
    skip: Vec<String>,

    /// Do not skip SCRIPT, STYLE and the other default tags
    #[arg(long)]
    no_default_skip: bool,
}

impl InputArgs {
    fn read(&self) -> Result<String, String> {
        if self.input == Path::new("-") {
            let mut html = String::new();
            io::stdin()
                .read_to_string(&mut html)
                .map_err(|e| format!("stdin: {e}"))?;
            return Ok(html);
        }
        fs::read_to_string(&self.input).map_err(|e| format!("{}: {e}", self.input.display()))
    }

    fn skip_set(&self) -> SkipTags {
        let mut tags = if self.no_default_skip {
            SkipTags::empty()
        } else {
            SkipTags::default()
        };
        tags.extend(self.skip.iter().cloned());
        tags
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Pair identical leaves with fragments by position instead of first match
    #[arg(long)]
    document_order: bool,
}

impl OutputArgs {
    fn policy(&self) -> MatchPolicy {
        if self.document_order {
            MatchPolicy::DocumentOrder
        } else {
            MatchPolicy::FirstMatch
        }
    }

    fn write(&self, html: &str) -> Result<(), String> {
        match &self.output {
            Some(path) => fs::write(path, html).map_err(|e| format!("{}: {e}", path.display())),
            None => {
                println!("{html}");
                Ok(())
            }
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Letters {
    Upper,
    Lower,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_env("MARKOVER_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("warning: failed to initialize logging: {e}");
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Extract { input } => extract(&input),
        Command::Apply { input, map, output } => apply(&input, &map, &output),
        Command::Case { input, to, output } => change_case(&input, to, &output),
    }
}

fn extract(input: &InputArgs) -> Result<(), String> {
    let html = input.read()?;
    let (dom, body) = ArenaDom::parse_body(&html).map_err(|e| e.to_string())?;
    let fragments = text::collect(&dom, &body, &input.skip_set());

    let json = serde_json::to_string_pretty(&fragments).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn apply(input: &InputArgs, map_path: &Path, output: &OutputArgs) -> Result<(), String> {
    let raw = fs::read_to_string(map_path).map_err(|e| format!("{}: {e}", map_path.display()))?;
    let map: HashMap<String, String> =
        serde_json::from_str(&raw).map_err(|e| format!("{}: {e}", map_path.display()))?;
    tracing::debug!(entries = map.len(), "loaded replacement map");

    let options = MarkOverOptions::new(input.read()?)
        .with_skip_set(input.skip_set())
        .policy(output.policy());
    let html = block_on(mark_over(
        options,
        sync_transform(|fragment| {
            map.get(&fragment.text)
                .cloned()
                .unwrap_or_else(|| fragment.text.clone())
        }),
    ))
    .map_err(|e| e.to_string())?;

    output.write(&html)
}

fn change_case(input: &InputArgs, to: Letters, output: &OutputArgs) -> Result<(), String> {
    let options = MarkOverOptions::new(input.read()?)
        .with_skip_set(input.skip_set())
        .policy(output.policy());
    let html = block_on(mark_over(
        options,
        sync_transform(|fragment| match to {
            Letters::Upper => fragment.text.to_uppercase(),
            Letters::Lower => fragment.text.to_lowercase(),
        }),
    ))
    .map_err(|e| e.to_string())?;

    output.write(&html)
}
