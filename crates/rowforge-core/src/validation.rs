use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::{Bounds, DataType, DefaultValue, DeferredCommand, TableSchema};

/// Validate generation invariants of a table schema.
///
/// Everything rejected here is a configuration error: the run aborts
/// before any row is generated and nothing is written.
pub fn validate_schema(schema: &TableSchema) -> Result<()> {
    if schema.rows == 0 {
        return Err(Error::InvalidSchema("row count must be >= 1".to_string()));
    }
    if schema.files == 0 {
        return Err(Error::InvalidSchema("file count must be >= 1".to_string()));
    }
    if u64::from(schema.files) > schema.rows {
        return Err(Error::InvalidSchema(format!(
            "{} files cannot be filled from {} rows",
            schema.files, schema.rows
        )));
    }
    if schema.columns.is_empty() {
        return Err(Error::InvalidSchema(
            "schema must define at least one column".to_string(),
        ));
    }

    let mut names = BTreeSet::new();
    for column in &schema.columns {
        if !names.insert(column.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate column name: {}",
                column.name
            )));
        }
    }

    for (index, column) in schema.columns.iter().enumerate() {
        let fail = |message: String| {
            Err(Error::InvalidSchema(format!(
                "column '{}': {}",
                column.name, message
            )))
        };

        if column.data_type == DataType::Decimal && !(1..=8).contains(&column.mantissa) {
            return fail(format!(
                "mantissa {} is out of range 1..=8",
                column.mantissa
            ));
        }

        if let Some(bounds) = column.bounds
            && bounds.is_inverted()
        {
            return fail("min bound exceeds max bound".to_string());
        }

        if let Some(monotonic) = column.monotonic {
            if column.data_type != DataType::Integer {
                return fail("monotonic generation requires an Integer column".to_string());
            }
            if monotonic.step < 1 {
                return fail(format!("monotonic step {} must be >= 1", monotonic.step));
            }
            let Some(Bounds::Int { max, .. }) = column.bounds else {
                return fail("monotonic generation requires integer bounds".to_string());
            };
            if monotonic.seed > max {
                return fail(format!(
                    "monotonic seed {} exceeds max bound {max}",
                    monotonic.seed
                ));
            }
            let capacity = (max as i128 - monotonic.seed as i128) / monotonic.step as i128 + 1;
            if capacity < schema.rows as i128 {
                return fail(format!(
                    "monotonic sequence yields {capacity} values but {} rows are requested",
                    schema.rows
                ));
            }
        }

        if let Some(selectivity) = column.selectivity {
            if selectivity > schema.rows {
                return fail(format!(
                    "selectivity {selectivity} exceeds row count {}",
                    schema.rows
                ));
            }
            if column.value_lists.is_empty() {
                if !column.domain.is_named() && column.bounds.is_none() {
                    return fail("selectivity requires bounds or a named domain".to_string());
                }
                if let Some(capacity) = column.distinct_capacity()
                    && u128::from(selectivity) > capacity
                {
                    return fail(format!(
                        "selectivity {selectivity} exceeds the {capacity} distinct values the bounds allow"
                    ));
                }
            }
        }

        match &column.default {
            Some(DefaultValue::Deferred { command, column: target }) => {
                if *target >= schema.columns.len() {
                    return fail(format!("deferred reference [{target}] is out of bounds"));
                }
                if *target == index {
                    return fail("deferred reference points at itself".to_string());
                }
                // Exactly one level of indirection: the referenced column
                // must resolve in the first pass.
                if matches!(
                    schema.columns[*target].default,
                    Some(DefaultValue::Deferred { .. })
                ) {
                    return fail(format!(
                        "deferred reference [{target}] points at another deferred column"
                    ));
                }
                if matches!(
                    command,
                    DeferredCommand::GreaterThan | DeferredCommand::LessThan
                ) && !matches!(
                    column.bounds,
                    Some(Bounds::Int { .. }) | Some(Bounds::Decimal { .. })
                ) {
                    return fail("range-bounded deferred functions require numeric bounds".to_string());
                }
            }
            Some(DefaultValue::Proportional(proportions)) => {
                if column.value_lists.len() < 2 {
                    return fail(
                        "proportional blend requires multiple value-list files".to_string(),
                    );
                }
                if proportions.len() != column.value_lists.len() {
                    return fail(format!(
                        "{} proportions given for {} value-list files",
                        proportions.len(),
                        column.value_lists.len()
                    ));
                }
                if proportions.iter().any(|p| *p < 0.0 || !p.is_finite()) {
                    return fail("proportions must be finite and non-negative".to_string());
                }
                if proportions.iter().sum::<f64>() < 1.0 {
                    return fail("proportions must sum to at least 1.0".to_string());
                }
            }
            _ => {}
        }

        let generates_directly = column.default.is_none()
            && column.value_lists.is_empty()
            && column.selectivity.is_none()
            && column.monotonic.is_none()
            && !column.domain.is_named();
        if generates_directly && column.bounds.is_none() {
            return fail("no bounds, domain, value list, or default to generate from".to_string());
        }
    }

    Ok(())
}
