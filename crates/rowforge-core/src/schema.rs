use std::path::PathBuf;

use chrono::NaiveDate;
use regex::Regex;

use crate::document::{ColumnRecord, SchemaDocument};
use crate::error::{Error, Result};

/// Date format used for date bounds and date output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reserved string-length bound meaning "emit a unique UUID token".
pub const UUID_LENGTH_SENTINEL: usize = 32;

/// Primitive data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    Date,
    Integer,
    Decimal,
}

impl DataType {
    pub fn code(self) -> u8 {
        match self {
            DataType::String => 1,
            DataType::Date => 2,
            DataType::Integer => 3,
            DataType::Decimal => 4,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(DataType::String),
            2 => Ok(DataType::Date),
            3 => Ok(DataType::Integer),
            4 => Ok(DataType::Decimal),
            other => Err(Error::InvalidDocument(format!(
                "unknown data type code {other}"
            ))),
        }
    }
}

/// Named semantic domain of a column; anything but `None` forces the
/// column type to String.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainClass {
    None,
    FirstName,
    LastName,
    FullName,
    StreetAddress,
    City,
    State,
    Country,
    ZipCode,
    Ssn,
    Phone,
}

impl DomainClass {
    pub fn code(self) -> u8 {
        match self {
            DomainClass::None => 1,
            DomainClass::FirstName => 2,
            DomainClass::LastName => 3,
            DomainClass::FullName => 4,
            DomainClass::StreetAddress => 5,
            DomainClass::City => 6,
            DomainClass::State => 7,
            DomainClass::Country => 8,
            DomainClass::ZipCode => 9,
            DomainClass::Ssn => 10,
            DomainClass::Phone => 11,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(DomainClass::None),
            2 => Ok(DomainClass::FirstName),
            3 => Ok(DomainClass::LastName),
            4 => Ok(DomainClass::FullName),
            5 => Ok(DomainClass::StreetAddress),
            6 => Ok(DomainClass::City),
            7 => Ok(DomainClass::State),
            8 => Ok(DomainClass::Country),
            9 => Ok(DomainClass::ZipCode),
            10 => Ok(DomainClass::Ssn),
            11 => Ok(DomainClass::Phone),
            other => Err(Error::InvalidDocument(format!(
                "unknown domain class code {other}"
            ))),
        }
    }

    pub fn is_named(self) -> bool {
        self != DomainClass::None
    }
}

/// Deferred function kind referencing a sibling column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredCommand {
    Assign,
    Equal,
    GreaterThan,
    LessThan,
}

impl DeferredCommand {
    fn token(self) -> &'static str {
        match self {
            DeferredCommand::Assign => "ASN",
            DeferredCommand::Equal => "EQL",
            DeferredCommand::GreaterThan => "GTR",
            DeferredCommand::LessThan => "LSS",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "ASN" => Some(DeferredCommand::Assign),
            "EQL" => Some(DeferredCommand::Equal),
            "GTR" => Some(DeferredCommand::GreaterThan),
            "LSS" => Some(DeferredCommand::LessThan),
            _ => None,
        }
    }
}

/// Default-value directive, resolved once at document load.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Constant applied verbatim to every row.
    Literal(String),
    /// Function of a sibling column, evaluated in the second pass.
    Deferred {
        command: DeferredCommand,
        column: usize,
    },
    /// Proportional blend over the column's value-list files.
    Proportional(Vec<f64>),
}

impl DefaultValue {
    fn parse(raw: &str) -> Result<Option<Self>> {
        if raw.is_empty() {
            return Ok(None);
        }
        if !raw.starts_with('&') {
            return Ok(Some(DefaultValue::Literal(raw.to_string())));
        }

        let deferred = Regex::new(r"^&([A-Z]{3})\[(\d+)\]$").ok();
        if let Some(caps) = deferred.as_ref().and_then(|re| re.captures(raw)) {
            if &caps[1] == "PRO" {
                return Err(Error::InvalidDocument(format!(
                    "malformed proportion directive '{raw}'"
                )));
            }
            let command = DeferredCommand::from_token(&caps[1]).ok_or_else(|| {
                Error::InvalidDocument(format!("unknown directive '{raw}'"))
            })?;
            let column: usize = caps[2]
                .parse()
                .map_err(|_| Error::InvalidDocument(format!("bad column index in '{raw}'")))?;
            return Ok(Some(DefaultValue::Deferred { command, column }));
        }

        let blend = Regex::new(r"^&PRO\[([^\]]+)\]$").ok();
        if let Some(caps) = blend.as_ref().and_then(|re| re.captures(raw)) {
            let mut proportions = Vec::new();
            for part in caps[1].split(',') {
                let value: f64 = part.trim().parse().map_err(|_| {
                    Error::InvalidDocument(format!("malformed proportion list '{raw}'"))
                })?;
                proportions.push(value);
            }
            return Ok(Some(DefaultValue::Proportional(proportions)));
        }

        Err(Error::InvalidDocument(format!("unknown directive '{raw}'")))
    }

    fn to_wire(&self) -> String {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Deferred { command, column } => {
                format!("&{}[{}]", command.token(), column)
            }
            DefaultValue::Proportional(proportions) => {
                let parts: Vec<String> = proportions.iter().map(|p| p.to_string()).collect();
                format!("&PRO[{}]", parts.join(","))
            }
        }
    }
}

/// Typed min/max bounds, interpreted according to the column data type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Int { min: i64, max: i64 },
    /// Whole-part bounds of a decimal column.
    Decimal { min: i64, max: i64 },
    Date { min: NaiveDate, max: NaiveDate },
    /// String-length bounds.
    Len { min: usize, max: usize },
}

impl Bounds {
    fn parse(data_type: DataType, min: &str, max: &str) -> Result<Self> {
        let parse_i64 = |raw: &str, side: &str| -> Result<i64> {
            raw.parse().map_err(|_| {
                Error::InvalidDocument(format!("{side} bound '{raw}' is not an integer"))
            })
        };
        match data_type {
            DataType::Integer => Ok(Bounds::Int {
                min: parse_i64(min, "min")?,
                max: parse_i64(max, "max")?,
            }),
            DataType::Decimal => Ok(Bounds::Decimal {
                min: parse_i64(min, "min")?,
                max: parse_i64(max, "max")?,
            }),
            DataType::Date => {
                let parse_date = |raw: &str, side: &str| -> Result<NaiveDate> {
                    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                        Error::InvalidDocument(format!("{side} bound '{raw}' is not a date"))
                    })
                };
                Ok(Bounds::Date {
                    min: parse_date(min, "min")?,
                    max: parse_date(max, "max")?,
                })
            }
            DataType::String => {
                let parse_len = |raw: &str, side: &str| -> Result<usize> {
                    raw.parse().map_err(|_| {
                        Error::InvalidDocument(format!("{side} bound '{raw}' is not a length"))
                    })
                };
                Ok(Bounds::Len {
                    min: parse_len(min, "min")?,
                    max: parse_len(max, "max")?,
                })
            }
        }
    }

    fn to_wire(self) -> (String, String) {
        match self {
            Bounds::Int { min, max } | Bounds::Decimal { min, max } => {
                (min.to_string(), max.to_string())
            }
            Bounds::Date { min, max } => (
                min.format(DATE_FORMAT).to_string(),
                max.format(DATE_FORMAT).to_string(),
            ),
            Bounds::Len { min, max } => (min.to_string(), max.to_string()),
        }
    }

    /// True when min exceeds max.
    pub fn is_inverted(self) -> bool {
        match self {
            Bounds::Int { min, max } | Bounds::Decimal { min, max } => min > max,
            Bounds::Date { min, max } => min > max,
            Bounds::Len { min, max } => min > max,
        }
    }
}

/// Monotonic sequence parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monotonic {
    pub seed: i64,
    pub step: i64,
}

/// Validated, typed description of one output column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: DataType,
    pub domain: DomainClass,
    pub bounds: Option<Bounds>,
    pub mantissa: u8,
    pub monotonic: Option<Monotonic>,
    /// Target distinct-value count; `None` means unconstrained.
    pub selectivity: Option<u64>,
    pub value_lists: Vec<PathBuf>,
    pub default: Option<DefaultValue>,
    /// Index into the materialized cardinality sets, assigned during the
    /// pre-pass; `None` until then.
    pub sel_column: Option<usize>,
}

impl ColumnSpec {
    /// Number of distinct values this column's bounds can produce, when
    /// computable. Named domains and absent bounds report `None`.
    pub fn distinct_capacity(&self) -> Option<u128> {
        if self.domain.is_named() {
            return None;
        }
        match self.bounds? {
            Bounds::Int { min, max } => Some((max as i128 - min as i128).unsigned_abs() + 1),
            Bounds::Decimal { min, max } => {
                let whole = (max as i128 - min as i128).unsigned_abs() + 1;
                let scale = 10_u128.checked_pow(u32::from(self.mantissa))?;
                whole.checked_mul(scale)
            }
            Bounds::Date { min, max } => Some((max - min).num_days().unsigned_abs() as u128 + 1),
            Bounds::Len { min, max } => {
                // Lower-bound alphabet of 26 letters per position.
                let mut total: u128 = 0;
                for len in min..=max {
                    let per_len = 26_u128.checked_pow(u32::try_from(len).ok()?)?;
                    total = total.checked_add(per_len)?;
                }
                Some(total)
            }
        }
    }
}

/// The unit of work: one logical table, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub version: String,
    pub rows: u64,
    pub files: u32,
    pub print_column_names: bool,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Interpret a serialized document into the typed model, resolving
    /// directives once so they are never re-parsed per row.
    pub fn from_document(doc: &SchemaDocument) -> Result<Self> {
        if doc.number_of_cols as usize != doc.columns.len() {
            return Err(Error::InvalidDocument(format!(
                "numberOfCols is {} but {} column records are present",
                doc.number_of_cols,
                doc.columns.len()
            )));
        }

        let mut columns = Vec::with_capacity(doc.columns.len());
        for record in &doc.columns {
            columns.push(column_from_record(record)?);
        }

        Ok(Self {
            name: doc.table_name.clone(),
            version: doc.version.clone(),
            rows: doc.number_of_rows,
            files: doc.number_of_files,
            print_column_names: doc.print_column_names,
            columns,
        })
    }

    /// Regenerate the serialized document. Together with
    /// [`TableSchema::from_document`] this is lossless for documents the
    /// engine itself produces.
    pub fn to_document(&self) -> SchemaDocument {
        SchemaDocument {
            table_name: self.name.clone(),
            version: self.version.clone(),
            number_of_cols: self.columns.len() as u32,
            number_of_rows: self.rows,
            number_of_files: self.files,
            print_column_names: self.print_column_names,
            columns: self.columns.iter().map(record_from_column).collect(),
        }
    }

    /// Rows each output file receives; the last file absorbs the
    /// remainder.
    pub fn rows_per_file(&self) -> u64 {
        self.rows / u64::from(self.files.max(1))
    }
}

fn column_from_record(record: &ColumnRecord) -> Result<ColumnSpec> {
    let domain = DomainClass::from_code(record.special_data_class)?;
    // A named domain forces the column type to String.
    let data_type = if domain.is_named() {
        DataType::String
    } else {
        DataType::from_code(record.data_type)?
    };

    let bounds = if record.min_value.is_empty() && record.max_value.is_empty() {
        None
    } else {
        Some(Bounds::parse(data_type, &record.min_value, &record.max_value)?)
    };

    let monotonic = record.monotonic.then_some(Monotonic {
        seed: record.monotonic_seed,
        step: record.monotonic_step,
    });

    let selectivity = u64::try_from(record.selectivity).ok().filter(|s| *s > 0);

    let value_lists = record
        .value_list_file
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect();

    let default = DefaultValue::parse(&record.default_value)?;

    let sel_column = usize::try_from(record.sel_column).ok();

    Ok(ColumnSpec {
        name: record.column_name.clone(),
        data_type,
        domain,
        bounds,
        mantissa: record.mantissa,
        monotonic,
        selectivity,
        value_lists,
        default,
        sel_column,
    })
}

fn record_from_column(column: &ColumnSpec) -> ColumnRecord {
    let (min_value, max_value) = column
        .bounds
        .map(Bounds::to_wire)
        .unwrap_or_else(|| (String::new(), String::new()));

    let value_list_file = column
        .value_lists
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(";");

    ColumnRecord {
        column_name: column.name.clone(),
        data_type: column.data_type.code(),
        special_data_class: column.domain.code(),
        default_value: column
            .default
            .as_ref()
            .map(DefaultValue::to_wire)
            .unwrap_or_default(),
        value_list_file,
        min_value,
        max_value,
        monotonic: column.monotonic.is_some(),
        monotonic_seed: column.monotonic.map(|m| m.seed).unwrap_or(0),
        monotonic_step: column.monotonic.map(|m| m.step).unwrap_or(0),
        mantissa: column.mantissa,
        selectivity: column.selectivity.map(|s| s as i64).unwrap_or(0),
        sel_column: column.sel_column.map(|c| c as i64).unwrap_or(-1),
    }
}
