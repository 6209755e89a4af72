//! Write the OpenAPI document as pretty JSON to stdout or a file.

use std::io::{self, Write};
use std::path::PathBuf;

use albaran::ApiDoc;
use clap::Parser;
use utoipa::OpenApi;

#[derive(Debug, Parser)]
#[command(name = "openapi-dump", about = "Export the Albaran OpenAPI document")]
struct Args {
    /// Destination file; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|err| io::Error::other(format!("serialise openapi: {err}")))?;
    match args.output {
        Some(path) => std::fs::write(path, json),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")
        }
    }
}
