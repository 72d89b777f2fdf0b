//! Per-column cardinality sets: the materialized candidate values that
//! satisfy a column's selectivity target or value-list requirement.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rand::Rng;
use tracing::{debug, warn};

use rowforge_core::{ColumnSpec, DATE_FORMAT, DataType, DefaultValue, TableSchema};

use crate::errors::GenerationError;
use crate::model::{GenerateOptions, Progress, RunReport};
use crate::providers;

/// Ordered, indexable collection of candidate values for one column.
#[derive(Debug, Clone)]
pub struct CardinalitySet {
    values: Vec<String>,
}

impl CardinalitySet {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

/// All cardinality sets of a run, derived once before any row is
/// generated and immutable afterwards. Columns reference their set via
/// `sel_column`.
#[derive(Debug, Default)]
pub struct CardinalityTable {
    sets: Vec<CardinalitySet>,
}

impl CardinalityTable {
    /// Build the sets for every column that needs one, assigning
    /// `sel_column` on the working schema as each set materializes.
    pub fn build(
        schema: &mut TableSchema,
        options: &GenerateOptions,
        progress: &Progress,
        report: &mut RunReport,
        rng: &mut impl Rng,
    ) -> Result<Self, GenerationError> {
        let rows = schema.rows;
        let mut sets = Vec::new();

        for column in &mut schema.columns {
            if !column.value_lists.is_empty() {
                let values = load_value_lists(column, rows, progress)?;
                // The column's effective type follows the loaded data.
                if let Some(first) = values.first() {
                    column.data_type = detect_type(first);
                }
                debug!(column = %column.name, values = values.len(), "value list loaded");
                column.sel_column = Some(sets.len());
                sets.push(CardinalitySet { values });
            } else if let Some(target) = column.selectivity {
                let values =
                    build_selectivity_set(column, target, options, progress, report, rng)?;
                column.sel_column = Some(sets.len());
                sets.push(CardinalitySet { values });
            } else {
                column.sel_column = None;
            }
        }

        Ok(Self { sets })
    }

    pub fn set(&self, index: usize) -> Option<&CardinalitySet> {
        self.sets.get(index)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

fn build_selectivity_set(
    column: &ColumnSpec,
    target: u64,
    options: &GenerateOptions,
    progress: &Progress,
    report: &mut RunReport,
    rng: &mut impl Rng,
) -> Result<Vec<String>, GenerationError> {
    let target_len = usize::try_from(target)
        .map_err(|_| GenerationError::Config(format!("selectivity {target} does not fit memory")))?;

    let capacity = natural_capacity(column);
    let relaxed = capacity.is_some_and(|capacity| u128::from(target) > capacity);
    if relaxed {
        warn!(
            column = %column.name,
            requested = target,
            capacity = %capacity.unwrap_or(0),
            "selectivity exceeds the domain's natural size; duplicates will be allowed"
        );
        report.relaxed_columns.push(column.name.clone());
    }

    let mut values = Vec::with_capacity(target_len);

    if relaxed {
        // Relaxed mode: exactly `target` draws, duplicates kept.
        for _ in 0..target_len {
            values.push(providers::column_value(column, options.letter_case, rng));
            progress.record_set_value();
        }
        return Ok(values);
    }

    let mut seen = HashSet::with_capacity(target_len);
    let mut attempts: u64 = 0;
    let attempt_ceiling = target.saturating_mul(100).saturating_add(10_000);
    while values.len() < target_len {
        attempts += 1;
        if attempts > attempt_ceiling {
            return Err(GenerationError::Config(format!(
                "column '{}': could not find {target} distinct values after {attempts} draws",
                column.name
            )));
        }
        let value = providers::column_value(column, options.letter_case, rng);
        if seen.insert(value.clone()) {
            values.push(value);
            progress.record_set_value();
            if values.len() % 10_000 == 0 {
                debug!(column = %column.name, built = values.len(), requested = target, "building selectivity set");
            }
        }
    }

    Ok(values)
}

fn natural_capacity(column: &ColumnSpec) -> Option<u128> {
    if column.domain.is_named() {
        providers::domain_capacity(column.domain).map(u128::from)
    } else {
        column.distinct_capacity()
    }
}

/// Load the column's value-list files into one master list. With a
/// proportional blend directive, each file contributes
/// `round(p_i * totalRows)` values capped at that file's own length.
fn load_value_lists(
    column: &ColumnSpec,
    total_rows: u64,
    progress: &Progress,
) -> Result<Vec<String>, GenerationError> {
    let proportions = match &column.default {
        Some(DefaultValue::Proportional(proportions)) => Some(proportions.as_slice()),
        _ => None,
    };

    let mut master = Vec::new();

    if let Some(proportions) = proportions {
        if proportions.len() != column.value_lists.len() {
            return Err(GenerationError::ValueList(format!(
                "column '{}': {} proportions for {} files",
                column.name,
                proportions.len(),
                column.value_lists.len()
            )));
        }
        if proportions.iter().sum::<f64>() < 1.0 {
            return Err(GenerationError::ValueList(format!(
                "column '{}': proportions must sum to at least 1.0",
                column.name
            )));
        }
        for (path, proportion) in column.value_lists.iter().zip(proportions) {
            let lines = read_value_list(path)?;
            let quota = ((proportion * total_rows as f64).round() as usize).min(lines.len());
            for value in lines.into_iter().take(quota) {
                master.push(value);
                progress.record_set_value();
            }
        }
    } else {
        for path in &column.value_lists {
            for value in read_value_list(path)? {
                master.push(value);
                progress.record_set_value();
            }
        }
    }

    if master.is_empty() {
        return Err(GenerationError::ValueList(format!(
            "column '{}': value lists contributed no values",
            column.name
        )));
    }

    Ok(master)
}

fn read_value_list(path: &Path) -> Result<Vec<String>, GenerationError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        GenerationError::ValueList(format!("failed to read {}: {err}", path.display()))
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Effective data type of a loaded value list, detected from its first
/// entry: date, then integer, then decimal, else string.
fn detect_type(value: &str) -> DataType {
    if NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok() {
        DataType::Date
    } else if value.parse::<i64>().is_ok() {
        DataType::Integer
    } else if value.parse::<f64>().is_ok() {
        DataType::Decimal
    } else {
        DataType::String
    }
}
