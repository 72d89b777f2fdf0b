use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rowforge_core::{Bounds, ColumnSpec, DataType, DomainClass, TableSchema};
use rowforge_generate::{GenerateOptions, GenerationEngine, TextEncoding};

fn int_column(name: &str, min: i64, max: i64) -> ColumnSpec {
    ColumnSpec {
        name: name.to_string(),
        data_type: DataType::Integer,
        domain: DomainClass::None,
        bounds: Some(Bounds::Int { min, max }),
        mantissa: 0,
        monotonic: None,
        selectivity: None,
        value_lists: Vec::new(),
        default: None,
        sel_column: None,
    }
}

fn table(name: &str, rows: u64, files: u32, headers: bool, columns: Vec<ColumnSpec>) -> TableSchema {
    TableSchema {
        name: name.to_string(),
        version: "1.0".to_string(),
        rows,
        files,
        print_column_names: headers,
        columns,
    }
}

fn temp_out_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rowforge_{tag}_{}", uuid::Uuid::new_v4()))
}

fn data_records(path: &Path, has_headers: bool) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .from_path(path)
        .expect("open output file");
    reader
        .records()
        .map(|record| {
            record
                .expect("read record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

#[test]
fn ten_rows_selectivity_ten_yields_ten_distinct_integers() {
    let mut column = int_column("amount", 1, 100);
    column.selectivity = Some(10);
    let schema = table("orders", 10, 1, true, vec![column]);

    let out_dir = temp_out_dir("distinct");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        ..GenerateOptions::default()
    };
    let report = GenerationEngine::new(options)
        .run(&schema)
        .expect("generation succeeds");

    assert_eq!(report.rows_generated, 10);
    assert_eq!(report.files_written, 1);

    let records = data_records(&out_dir.join("orders.csv"), true);
    assert_eq!(records.len(), 10);

    let mut seen = HashSet::new();
    for record in &records {
        let value: i64 = record[0].parse().expect("integer cell");
        assert!((1..=100).contains(&value), "value {value} out of range");
        assert!(seen.insert(value), "value {value} repeated");
    }
}

#[test]
fn header_line_is_written_to_every_file() {
    let schema = table(
        "people",
        10,
        2,
        true,
        vec![int_column("a", 1, 100), int_column("b", 1, 100)],
    );

    let out_dir = temp_out_dir("headers");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        ..GenerateOptions::default()
    };
    GenerationEngine::new(options)
        .run(&schema)
        .expect("generation succeeds");

    for file in ["people_1.csv", "people_2.csv"] {
        let contents = fs::read_to_string(out_dir.join(file)).expect("read output");
        let first_line = contents.lines().next().expect("non-empty file");
        assert_eq!(first_line, "a,b");
    }
}

#[test]
fn cache_flushes_and_rollover_follow_the_quotas() {
    // Same arithmetic as the full-scale run: rows / threshold flushes,
    // one rollover at the halfway row.
    let schema = table("events", 1_000, 2, false, vec![int_column("id", 1, 10_000_000)]);

    let out_dir = temp_out_dir("rollover");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        flush_threshold: 100,
        ..GenerateOptions::default()
    };
    let report = GenerationEngine::new(options)
        .run(&schema)
        .expect("generation succeeds");

    assert_eq!(report.cache_flushes, 10);
    assert_eq!(report.files_written, 2);

    let first = data_records(&out_dir.join("events_1.csv"), false);
    let second = data_records(&out_dir.join("events_2.csv"), false);
    assert_eq!(first.len(), 500);
    assert_eq!(second.len(), 500);
}

#[test]
fn million_row_run_flushes_ten_times_and_rolls_over_once() {
    let schema = table(
        "bulk",
        1_000_000,
        2,
        false,
        vec![int_column("id", 1, 2_000_000_000)],
    );

    let out_dir = temp_out_dir("bulk");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        flush_threshold: 100_000,
        ..GenerateOptions::default()
    };
    let report = GenerationEngine::new(options)
        .run(&schema)
        .expect("generation succeeds");

    assert_eq!(report.cache_flushes, 10);
    assert_eq!(report.files_written, 2);
    assert_eq!(report.rows_generated, 1_000_000);

    let count_lines = |name: &str| {
        fs::read_to_string(out_dir.join(name))
            .expect("read output")
            .lines()
            .count()
    };
    assert_eq!(count_lines("bulk_1.csv"), 500_000);
    assert_eq!(count_lines("bulk_2.csv"), 500_000);
}

#[test]
fn last_file_absorbs_the_remainder() {
    let schema = table("rem", 10, 3, false, vec![int_column("id", 1, 1000)]);

    let out_dir = temp_out_dir("remainder");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        ..GenerateOptions::default()
    };
    GenerationEngine::new(options)
        .run(&schema)
        .expect("generation succeeds");

    let counts: Vec<usize> = (1..=3)
        .map(|index| data_records(&out_dir.join(format!("rem_{index}.csv")), false).len())
        .collect();
    assert_eq!(counts, vec![3, 3, 4]);
}

#[test]
fn identical_seeds_reproduce_identical_files() {
    let schema = table(
        "repro",
        50,
        1,
        true,
        vec![int_column("a", 1, 1_000_000), int_column("b", -500, 500)],
    );

    let mut outputs = Vec::new();
    for round in 0..2 {
        let out_dir = temp_out_dir(&format!("repro{round}"));
        let options = GenerateOptions {
            out_dir: out_dir.clone(),
            seed: 42,
            ..GenerateOptions::default()
        };
        GenerationEngine::new(options)
            .run(&schema)
            .expect("generation succeeds");
        outputs.push(fs::read_to_string(out_dir.join("repro.csv")).expect("read output"));
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn utf16_output_has_no_byte_order_mark() {
    let schema = table("wide", 5, 1, true, vec![int_column("id", 1, 9)]);

    let out_dir = temp_out_dir("utf16");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        encoding: TextEncoding::Utf16,
        ..GenerateOptions::default()
    };
    GenerationEngine::new(options)
        .run(&schema)
        .expect("generation succeeds");

    let bytes = fs::read(out_dir.join("wide.csv")).expect("read output");
    assert_eq!(bytes.len() % 2, 0);
    // First code unit is the header's 'i', not U+FEFF.
    assert_eq!(&bytes[..2], &[b'i', 0x00]);
}

#[test]
fn monotonic_column_counts_up_from_seed() {
    let mut column = int_column("seq", 0, 10_000);
    column.monotonic = Some(rowforge_core::Monotonic { seed: 100, step: 7 });
    let schema = table("mono", 20, 1, false, vec![column]);

    let out_dir = temp_out_dir("monotonic");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        ..GenerateOptions::default()
    };
    GenerationEngine::new(options)
        .run(&schema)
        .expect("generation succeeds");

    let records = data_records(&out_dir.join("mono.csv"), false);
    let values: Vec<i64> = records
        .iter()
        .map(|record| record[0].parse().expect("integer cell"))
        .collect();

    assert_eq!(values[0], 100);
    for pair in values.windows(2) {
        assert_eq!(pair[1], pair[0] + 7);
    }
}

#[test]
fn infeasible_schema_writes_nothing() {
    let mut column = int_column("a", 1, 5);
    column.selectivity = Some(50);
    let schema = table("bad", 100, 1, false, vec![column]);

    let out_dir = temp_out_dir("nothing");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        ..GenerateOptions::default()
    };
    let result = GenerationEngine::new(options).run(&schema);

    assert!(result.is_err());
    assert!(!out_dir.exists());
}
