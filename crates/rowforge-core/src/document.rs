use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Serialized table description exchanged with external collaborators.
///
/// The document may be written by hand, by the schema wizard, or by the
/// database-introspection tool; the engine only interprets it. Field names
/// and numeric codes are part of the wire contract and never change shape
/// between load and save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub table_name: String,
    /// Contract version for this document format.
    pub version: String,
    pub number_of_cols: u32,
    pub number_of_rows: u64,
    pub number_of_files: u32,
    pub print_column_names: bool,
    pub columns: Vec<ColumnRecord>,
}

/// One column entry of a [`SchemaDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRecord {
    pub column_name: String,
    /// 1=String, 2=Date, 3=Integer, 4=Decimal.
    pub data_type: u8,
    /// 1=none, 2=first-name, 3=last-name, 4=full-name, 5=street-address,
    /// 6=city, 7=state, 8=country, 9=zip-code, 10=ssn, 11=phone.
    pub special_data_class: u8,
    /// Literal constant, `&ASN[j]`/`&EQL[j]`/`&GTR[j]`/`&LSS[j]` deferred
    /// reference, `&PRO[p1,...]` blend directive, or empty.
    pub default_value: String,
    /// Semicolon-separated list of value-list file paths, or empty.
    pub value_list_file: String,
    pub min_value: String,
    pub max_value: String,
    pub monotonic: bool,
    pub monotonic_seed: i64,
    pub monotonic_step: i64,
    /// Digits after the decimal point for Decimal columns.
    pub mantissa: u8,
    /// Target distinct-value count; 0 means unconstrained.
    pub selectivity: i64,
    /// Index into the materialized cardinality sets; -1 when none.
    pub sel_column: i64,
}

/// Current contract version for schema documents.
pub const DOCUMENT_VERSION: &str = "1.0";
