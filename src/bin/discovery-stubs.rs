//! Discovery Stubs CLI
//!
//! Command-line interface for expanding discovery documents into JSON stubs.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use discovery_stubs::{
    load_document, resolve_ref, to_pretty_json, DiscoveryDocument, Direction, Limits, PathFilter,
    ResolveOptions, StubWriter, Walker, MATCH_ALL,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "discovery-stubs")]
#[command(about = "Generate JSON request/response stubs from Google API discovery documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write method.json, request.json and response.json for every method
    Generate {
        /// Path to the discovery JSON file
        discovery_doc: PathBuf,

        /// Path to the output directory
        output_dir: PathBuf,

        #[command(flatten)]
        resolve: ResolveArgs,

        /// Regex matched against method directories (e.g. b/{bucket}/GET)
        #[arg(long, default_value = MATCH_ALL)]
        regex: String,

        /// Suppress per-file progress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Resolve a single schema and print it
    Resolve {
        /// Path to the discovery JSON file
        discovery_doc: PathBuf,

        /// Schema name from the document's schema table
        schema: String,

        /// Use the request limits
        #[arg(long, conflicts_with = "response")]
        request: bool,

        /// Use the response limits (default)
        #[arg(long, conflicts_with = "request")]
        response: bool,

        #[command(flatten)]
        resolve: ResolveArgs,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the method directories that would be generated
    List {
        /// Path to the discovery JSON file
        discovery_doc: PathBuf,

        /// Regex matched against method directories (e.g. b/{bucket}/GET)
        #[arg(long, default_value = MATCH_ALL)]
        regex: String,
    },
}

#[derive(Args)]
struct ResolveArgs {
    /// Maximum recursion depth for requests
    #[arg(long, default_value_t = 100)]
    request_max_depth: usize,

    /// Start depth for applying branch limits in requests
    #[arg(long, default_value_t = 1)]
    request_start_depth: usize,

    /// Maximum branches to resolve for requests
    #[arg(long, default_value_t = 10)]
    request_max_branches: usize,

    /// Maximum recursion depth for responses
    #[arg(long, default_value_t = 100)]
    response_max_depth: usize,

    /// Start depth for applying branch limits in responses
    #[arg(long, default_value_t = 1)]
    response_start_depth: usize,

    /// Maximum branches to resolve for responses
    #[arg(long, default_value_t = 10)]
    response_max_branches: usize,

    /// Comma-separated list of blacklisted schemas
    #[arg(long, value_delimiter = ',')]
    blacklisted_schemas: Vec<String>,

    /// Include documentation strings in the output
    #[arg(long)]
    docs: bool,
}

impl ResolveArgs {
    fn options(&self, direction: Direction) -> ResolveOptions {
        let limits = match direction {
            Direction::Request => Limits {
                max_depth: self.request_max_depth,
                max_branches: self.request_max_branches,
                start_depth: self.request_start_depth,
            },
            Direction::Response => Limits {
                max_depth: self.response_max_depth,
                max_branches: self.response_max_branches,
                start_depth: self.response_start_depth,
            },
        };

        ResolveOptions::new(direction)
            .limits(limits)
            .blacklist(self.blacklisted_schemas.iter().cloned())
            .include_docs(self.docs)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            discovery_doc,
            output_dir,
            resolve,
            regex,
            quiet,
        } => run_generate(&discovery_doc, &output_dir, &resolve, &regex, quiet),

        Commands::Resolve {
            discovery_doc,
            schema,
            request,
            response: _,
            resolve,
            output,
            pretty,
        } => run_resolve(&discovery_doc, &schema, request, &resolve, output, pretty),

        Commands::List {
            discovery_doc,
            regex,
        } => run_list(&discovery_doc, &regex),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Log to stderr so stub output on stdout stays clean. `RUST_LOG` overrides
/// the verbosity flag.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,discovery_stubs={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_generate(
    discovery_doc: &Path,
    output_dir: &Path,
    resolve: &ResolveArgs,
    regex: &str,
    quiet: bool,
) -> Result<(), u8> {
    let filter = path_filter(regex)?;
    let document = load(discovery_doc)?;

    let request = resolve.options(Direction::Request);
    let response = resolve.options(Direction::Response);
    let walker = Walker::new(&document, &filter, &request, &response);
    let writer = StubWriter::new(output_dir);

    std::fs::create_dir_all(output_dir).map_err(|e| {
        eprintln!("Error: cannot create {}: {}", output_dir.display(), e);
        3u8
    })?;

    let mut methods = 0usize;
    let mut skipped = 0usize;
    for stub in walker.iter() {
        for (direction, error) in stub.errors() {
            warn!(method = %stub.dir, side = direction.method_key(), "skipping {}: {}", direction.file_name(), error);
            skipped += 1;
        }

        let written = writer.write(&stub).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        methods += 1;

        if !quiet {
            for file in &written {
                println!(
                    "[*] {:.2}s {}B {}",
                    file.elapsed.as_secs_f64(),
                    file.bytes,
                    file.path.display()
                );
            }
        }
    }

    info!(methods, skipped, "generation finished");
    println!("Files generated in directory: {}", output_dir.display());

    if skipped > 0 {
        eprintln!("{} artifact(s) skipped because of unresolved schemas", skipped);
        return Err(1);
    }
    Ok(())
}

fn run_resolve(
    discovery_doc: &Path,
    schema: &str,
    request: bool,
    resolve: &ResolveArgs,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let document = load(discovery_doc)?;
    let options = resolve.options(Direction::from_request_flag(request));

    let resolved = resolve_ref(&document.schemas, schema, &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if pretty {
        to_pretty_json(&resolved).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    } else {
        serde_json::to_string(&resolved)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_list(discovery_doc: &Path, regex: &str) -> Result<(), u8> {
    let filter = path_filter(regex)?;
    let document = load(discovery_doc)?;

    let request = ResolveOptions::new(Direction::Request);
    let response = ResolveOptions::new(Direction::Response);
    let walker = Walker::new(&document, &filter, &request, &response);

    for selected in walker.selected() {
        println!("{}", selected.dir);
    }
    Ok(())
}

fn path_filter(regex: &str) -> Result<PathFilter, u8> {
    PathFilter::new(regex).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn load(path: &Path) -> Result<DiscoveryDocument, u8> {
    load_document(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}
