use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use rowforge_core::{TableSchema, validate_schema};

use crate::cardinality::CardinalityTable;
use crate::errors::GenerationError;
use crate::model::{GenerateOptions, Progress, RunReport};
use crate::output::OutputCache;
use crate::resolver::RowResolver;

/// Entry point for generating a table's output files from a schema.
///
/// Single-threaded and synchronous: one row is fully resolved and
/// appended before the next begins. Parallel throughput comes from
/// running independent engine instances over pre-partitioned schemas,
/// never from concurrency inside a run.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
    progress: Progress,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            progress: Progress::new(),
        }
    }

    /// Liveness counters, observable from another thread while `run`
    /// blocks.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    pub fn run(&self, schema: &TableSchema) -> Result<RunReport, GenerationError> {
        let start = Instant::now();
        validate_schema(schema)?;

        // Working copy: the pre-pass records set indexes and re-detected
        // list types on it; the caller's schema stays untouched.
        let mut schema = schema.clone();
        let mut report = RunReport::new(schema.name.clone(), schema.rows);
        let mut rng = ChaCha8Rng::seed_from_u64(self.options.seed);

        info!(
            table = %schema.name,
            rows = schema.rows,
            files = schema.files,
            seed = self.options.seed,
            "generation started"
        );

        let sets = CardinalityTable::build(
            &mut schema,
            &self.options,
            &self.progress,
            &mut report,
            &mut rng,
        )?;

        std::fs::create_dir_all(&self.options.out_dir)?;
        let mut resolver = RowResolver::new(&schema, &sets, &self.options);
        let mut cache = OutputCache::new(&schema, &self.options, self.progress.clone());

        for ordinal in 0..schema.rows {
            let row = resolver.resolve(ordinal, &mut rng, &mut report);
            cache.append(row)?;
            self.progress.record_row();
            if (ordinal + 1) % 100_000 == 0 {
                debug!(table = %schema.name, rows = ordinal + 1, "rows resolved");
            }
        }

        let stats = cache.finish()?;
        report.rows_generated = schema.rows;
        report.files_written = stats.files_written;
        report.cache_flushes = stats.cache_flushes;
        report.bytes_written = stats.bytes_written;
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            table = %schema.name,
            rows = report.rows_generated,
            files = report.files_written,
            flushes = report.cache_flushes,
            resolution_errors = report.resolution_errors,
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(report)
    }
}
