//! Two-pass row resolution.
//!
//! The first pass assigns every column through a fixed precedence order,
//! leaving a sentinel in slots whose value is a deferred function of a
//! sibling column. The second pass sweeps those sentinels once — the
//! source format permits exactly one level of indirection, so no
//! dependency solver is needed or wanted.

use rand::Rng;
use tracing::warn;

use rowforge_core::{
    Bounds, ColumnSpec, DefaultValue, DeferredCommand, Monotonic, TableSchema,
};

use crate::cardinality::{CardinalitySet, CardinalityTable};
use crate::model::{GenerateOptions, RunReport};
use crate::providers;

/// One cell of the row buffer during resolution.
#[derive(Debug, Clone)]
enum Slot {
    /// Resolution failed; serialized as a blank field.
    Empty,
    /// Deferred-function sentinel awaiting the second pass.
    Deferred,
    Value(String),
}

/// Resolves rows one at a time, in schema order.
///
/// The resolver owns the only cross-row state of a run: the monotonic
/// cursor per column. Everything else is a pure function of the schema,
/// the row ordinal, the cardinality sets, and the random source.
pub struct RowResolver<'a> {
    schema: &'a TableSchema,
    sets: &'a CardinalityTable,
    options: &'a GenerateOptions,
    monotonic: Vec<Option<i64>>,
}

impl<'a> RowResolver<'a> {
    pub fn new(
        schema: &'a TableSchema,
        sets: &'a CardinalityTable,
        options: &'a GenerateOptions,
    ) -> Self {
        Self {
            schema,
            sets,
            options,
            monotonic: vec![None; schema.columns.len()],
        }
    }

    /// Resolve every column of the row at `ordinal`. Cells that fail
    /// deferred resolution come back as empty strings; the run continues.
    pub fn resolve(
        &mut self,
        ordinal: u64,
        rng: &mut impl Rng,
        report: &mut RunReport,
    ) -> Vec<String> {
        let schema = self.schema;
        let mut slots = Vec::with_capacity(schema.columns.len());
        for (index, column) in schema.columns.iter().enumerate() {
            slots.push(self.first_pass(index, column, ordinal, rng));
        }

        for index in 0..slots.len() {
            if !matches!(slots[index], Slot::Deferred) {
                continue;
            }
            let column = &schema.columns[index];
            let Some(DefaultValue::Deferred { command, column: target }) = &column.default else {
                slots[index] = Slot::Empty;
                continue;
            };
            match self.second_pass(column, *command, *target, &slots, rng) {
                Ok(value) => slots[index] = Slot::Value(value),
                Err(reason) => {
                    warn!(
                        column = %column.name,
                        row = ordinal,
                        %reason,
                        "deferred resolution failed; cell left unresolved"
                    );
                    report.resolution_errors += 1;
                    slots[index] = Slot::Empty;
                }
            }
        }

        slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Value(value) => value,
                Slot::Empty | Slot::Deferred => String::new(),
            })
            .collect()
    }

    fn first_pass(
        &mut self,
        index: usize,
        column: &ColumnSpec,
        ordinal: u64,
        rng: &mut impl Rng,
    ) -> Slot {
        match &column.default {
            Some(DefaultValue::Literal(value)) => return Slot::Value(value.clone()),
            Some(DefaultValue::Deferred { .. }) => return Slot::Deferred,
            // A blend directive only steers value-list loading.
            Some(DefaultValue::Proportional(_)) | None => {}
        }

        if !column.value_lists.is_empty() {
            if let Some(set) = self.column_set(column) {
                let index = if self.schema.rows <= set.len() as u64
                    && self.options.unique_list_values
                {
                    // One value per row ordinal while capacity allows:
                    // each list entry is consumed at most once.
                    ordinal as usize
                } else {
                    rng.random_range(0..set.len())
                };
                return Slot::Value(set.value(index).unwrap_or_default().to_string());
            }
            return Slot::Empty;
        }

        if let Some(selectivity) = column.selectivity {
            if let Some(set) = self.column_set(column) {
                let index = if selectivity == self.schema.rows {
                    // Full uniqueness by construction.
                    ordinal as usize
                } else {
                    rng.random_range(0..set.len())
                };
                return Slot::Value(set.value(index).unwrap_or_default().to_string());
            }
            return Slot::Empty;
        }

        if let Some(Monotonic { seed, step }) = column.monotonic {
            let next = match self.monotonic[index] {
                None => seed,
                Some(previous) => previous.saturating_add(step),
            };
            self.monotonic[index] = Some(next);
            return Slot::Value(next.to_string());
        }

        if column.domain.is_named() {
            return Slot::Value(providers::domain_value(column.domain, rng));
        }

        Slot::Value(providers::column_value(
            column,
            self.options.letter_case,
            rng,
        ))
    }

    fn second_pass(
        &self,
        column: &ColumnSpec,
        command: DeferredCommand,
        target: usize,
        slots: &[Slot],
        rng: &mut impl Rng,
    ) -> Result<String, String> {
        let resolved = match slots.get(target) {
            Some(Slot::Value(value)) => value.as_str(),
            Some(_) => return Err(format!("referenced column [{target}] is unresolved")),
            None => return Err(format!("referenced column [{target}] is out of bounds")),
        };

        match command {
            DeferredCommand::Equal => Ok(resolved.to_string()),
            DeferredCommand::Assign => {
                let set = self
                    .column_set(column)
                    .filter(|set| !set.is_empty())
                    .ok_or_else(|| "no value list to map into".to_string())?;
                let seed = assign_seed(resolved);
                let index = (seed.unsigned_abs() % set.len() as u64) as usize;
                Ok(set.value(index).unwrap_or_default().to_string())
            }
            DeferredCommand::GreaterThan => {
                let lower = numeric_operand(resolved)
                    .ok_or_else(|| format!("operand '{resolved}' is not numeric"))?;
                let max = numeric_max(column).ok_or("column has no numeric max bound")?;
                if lower >= max {
                    return Err(format!("operand {lower} is already >= max bound {max}"));
                }
                Ok(rng.random_range(lower + 1..=max).to_string())
            }
            DeferredCommand::LessThan => {
                let upper = numeric_operand(resolved)
                    .ok_or_else(|| format!("operand '{resolved}' is not numeric"))?;
                let min = numeric_min(column).ok_or("column has no numeric min bound")?;
                if upper <= min {
                    return Err(format!("operand {upper} is already <= min bound {min}"));
                }
                Ok(rng.random_range(min..upper).to_string())
            }
        }
    }

    fn column_set(&self, column: &ColumnSpec) -> Option<&CardinalitySet> {
        column.sel_column.and_then(|index| self.sets.set(index))
    }
}

/// Numeric seed of a resolved value for deterministic mapping: integers
/// directly, decimals truncated, strings as the sum of their character
/// codes.
fn assign_seed(value: &str) -> i64 {
    if let Ok(int) = value.parse::<i64>() {
        return int;
    }
    if let Ok(dec) = value.parse::<f64>() {
        return dec.trunc() as i64;
    }
    value.chars().map(|ch| ch as i64).sum()
}

fn numeric_operand(value: &str) -> Option<i64> {
    if let Ok(int) = value.parse::<i64>() {
        return Some(int);
    }
    value.parse::<f64>().ok().map(|dec| dec.trunc() as i64)
}

fn numeric_max(column: &ColumnSpec) -> Option<i64> {
    match column.bounds? {
        Bounds::Int { max, .. } | Bounds::Decimal { max, .. } => Some(max),
        _ => None,
    }
}

fn numeric_min(column: &ColumnSpec) -> Option<i64> {
    match column.bounds? {
        Bounds::Int { min, .. } | Bounds::Decimal { min, .. } => Some(min),
        _ => None,
    }
}
