//! Print the registry's OpenAPI document as JSON.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use subdomain_registry::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Parser)]
#[command(name = "openapi-dump", about = "Write the OpenAPI document")]
struct Cli {
    /// File to write instead of standard output.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(io::Error::other)?;
    match cli.output {
        Some(path) => fs::write(path, format!("{json}\n")),
        None => writeln!(io::stdout().lock(), "{json}"),
    }
}
