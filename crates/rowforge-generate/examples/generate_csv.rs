use std::env;
use std::path::PathBuf;

use rowforge_core::{SchemaDocument, TableSchema};
use rowforge_generate::{GenerateOptions, GenerationEngine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut schema_path: Option<PathBuf> = None;
    let mut out_dir: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" => schema_path = args.next().map(PathBuf::from),
            "--out" => out_dir = args.next().map(PathBuf::from),
            "--seed" => seed = args.next().and_then(|value| value.parse().ok()),
            _ => {
                if schema_path.is_none() {
                    schema_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let schema_path = schema_path.ok_or("missing --schema path")?;
    let schema_json = std::fs::read_to_string(&schema_path)?;
    let document: SchemaDocument = serde_json::from_str(&schema_json)?;
    let schema = TableSchema::from_document(&document)?;

    let mut options = GenerateOptions::default();
    if let Some(out_dir) = out_dir {
        options.out_dir = out_dir;
    }
    if let Some(seed) = seed {
        options.seed = seed;
    }

    let engine = GenerationEngine::new(options);
    let report = engine.run(&schema)?;

    println!(
        "rows={} files={} flushes={} bytes={}",
        report.rows_generated, report.files_written, report.cache_flushes, report.bytes_written
    );
    Ok(())
}
