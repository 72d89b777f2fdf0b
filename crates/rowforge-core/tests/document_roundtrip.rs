use rowforge_core::{
    DataType, DefaultValue, DeferredCommand, DomainClass, SchemaDocument, TableSchema,
};

fn sample_document_json() -> &'static str {
    r#"{
  "tableName": "customers",
  "version": "1.0",
  "numberOfCols": 4,
  "numberOfRows": 1000,
  "numberOfFiles": 2,
  "printColumnNames": true,
  "columns": [
    {
      "columnName": "customer_id",
      "dataType": 3,
      "specialDataClass": 1,
      "defaultValue": "",
      "valueListFile": "",
      "minValue": "1",
      "maxValue": "100000",
      "monotonic": true,
      "monotonicSeed": 1,
      "monotonicStep": 1,
      "mantissa": 0,
      "selectivity": 0,
      "selColumn": -1
    },
    {
      "columnName": "city",
      "dataType": 1,
      "specialDataClass": 6,
      "defaultValue": "",
      "valueListFile": "",
      "minValue": "",
      "maxValue": "",
      "monotonic": false,
      "monotonicSeed": 0,
      "monotonicStep": 0,
      "mantissa": 0,
      "selectivity": 25,
      "selColumn": -1
    },
    {
      "columnName": "region_code",
      "dataType": 1,
      "specialDataClass": 1,
      "defaultValue": "&ASN[1]",
      "valueListFile": "regions_a.txt;regions_b.txt",
      "minValue": "",
      "maxValue": "",
      "monotonic": false,
      "monotonicSeed": 0,
      "monotonicStep": 0,
      "mantissa": 0,
      "selectivity": 0,
      "selColumn": -1
    },
    {
      "columnName": "balance",
      "dataType": 4,
      "specialDataClass": 1,
      "defaultValue": "",
      "valueListFile": "",
      "minValue": "0",
      "maxValue": "5000",
      "monotonic": false,
      "monotonicSeed": 0,
      "monotonicStep": 0,
      "mantissa": 2,
      "selectivity": 0,
      "selColumn": -1
    }
  ]
}"#
}

#[test]
fn document_loads_into_typed_model() {
    let doc: SchemaDocument = serde_json::from_str(sample_document_json()).expect("parse document");
    let schema = TableSchema::from_document(&doc).expect("interpret document");

    assert_eq!(schema.name, "customers");
    assert_eq!(schema.rows, 1000);
    assert_eq!(schema.files, 2);
    assert_eq!(schema.columns.len(), 4);

    let id = &schema.columns[0];
    assert_eq!(id.data_type, DataType::Integer);
    assert_eq!(id.monotonic.map(|m| (m.seed, m.step)), Some((1, 1)));

    let city = &schema.columns[1];
    assert_eq!(city.domain, DomainClass::City);
    assert_eq!(city.data_type, DataType::String);
    assert_eq!(city.selectivity, Some(25));

    let region = &schema.columns[2];
    assert_eq!(region.value_lists.len(), 2);
    assert_eq!(
        region.default,
        Some(DefaultValue::Deferred {
            command: DeferredCommand::Assign,
            column: 1
        })
    );

    let balance = &schema.columns[3];
    assert_eq!(balance.data_type, DataType::Decimal);
    assert_eq!(balance.mantissa, 2);
}

#[test]
fn load_regenerate_reserialize_is_identity() {
    let doc: SchemaDocument = serde_json::from_str(sample_document_json()).expect("parse document");
    let schema = TableSchema::from_document(&doc).expect("interpret document");
    let regenerated = schema.to_document();

    assert_eq!(regenerated, doc);

    let original_json: serde_json::Value =
        serde_json::from_str(sample_document_json()).expect("parse original json");
    let regenerated_json =
        serde_json::to_value(&regenerated).expect("serialize regenerated document");
    assert_eq!(regenerated_json, original_json);
}

#[test]
fn proportional_directive_survives_round_trip() {
    let mut doc: SchemaDocument =
        serde_json::from_str(sample_document_json()).expect("parse document");
    doc.columns[2].default_value = "&PRO[0.6,0.4]".to_string();

    let schema = TableSchema::from_document(&doc).expect("interpret document");
    assert_eq!(
        schema.columns[2].default,
        Some(DefaultValue::Proportional(vec![0.6, 0.4]))
    );
    assert_eq!(schema.to_document(), doc);
}

#[test]
fn mismatched_column_count_is_rejected() {
    let mut doc: SchemaDocument =
        serde_json::from_str(sample_document_json()).expect("parse document");
    doc.number_of_cols = 7;

    assert!(TableSchema::from_document(&doc).is_err());
}

#[test]
fn malformed_directives_are_rejected() {
    let mut doc: SchemaDocument =
        serde_json::from_str(sample_document_json()).expect("parse document");

    for bad in ["&XYZ[0]", "&PRO[abc]", "&ASN[]", "&GTR[one]"] {
        doc.columns[2].default_value = bad.to_string();
        assert!(
            TableSchema::from_document(&doc).is_err(),
            "directive '{bad}' should be rejected"
        );
    }
}
