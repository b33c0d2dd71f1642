use sereal::{Decoder, Encoder, Value};

fn record(suffix: &str) -> Value {
    Value::Hash(vec![
        (
            "first_name".to_string(),
            Value::Str(format!("member {suffix}")),
        ),
        (
            "shared_company".to_string(),
            Value::Str("Example Heavy Industries".into()),
        ),
        (
            "shared_department".to_string(),
            Value::Str("Binary Plumbing".into()),
        ),
    ])
}

#[test]
fn repeated_strings_are_copy_deduplicated() {
    // keys and values repeat across nested levels
    let input = Value::Array(vec![record("one"), record("two"), record("three")]);
    let single = Value::Array(vec![record("one")]);

    let mut encoder = Encoder::new();
    let doc = encoder.encode(&input).unwrap();
    let single_doc = encoder.encode(&single).unwrap();

    // three records must cost far less than three times one record
    assert!(
        doc.len() < single_doc.len() * 2,
        "COPY dedup missing: three records {} bytes, one record {} bytes",
        doc.len(),
        single_doc.len()
    );

    let decoder = Decoder::new();
    assert_eq!(decoder.decode(&doc).unwrap(), input);
}

#[test]
fn dedup_works_in_version_one_offset_base() {
    let input = Value::Array(vec![record("a"), record("b")]);
    let mut encoder = Encoder::new();
    encoder.version = 1;
    let doc = encoder.encode(&input).unwrap();
    assert_eq!(Decoder::new().decode(&doc).unwrap(), input);
}

#[test]
fn copy_offsets_resolve_through_typed_decode() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Record {
        first_name: String,
        shared_company: String,
        shared_department: String,
    }

    let input = Value::Array(vec![record("one"), record("two")]);
    let doc = Encoder::new().encode(&input).unwrap();

    let records: Vec<Record> = Decoder::new().unmarshal(&doc).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].shared_company, "Example Heavy Industries");
    assert_eq!(records[1].shared_company, "Example Heavy Industries");
    assert_eq!(records[1].first_name, "member two");
}

#[test]
fn short_strings_are_not_deduplicated() {
    // three-byte strings cost less inline than a COPY back-reference
    let input = Value::Array(vec![
        Value::Str("abc".into()),
        Value::Str("abc".into()),
    ]);
    let doc = Encoder::new().encode(&input).unwrap();
    assert_eq!(Decoder::new().decode(&doc).unwrap(), input);

    let copies = doc
        .iter()
        .filter(|&&b| b == sereal::constants::TAG_COPY)
        .count();
    assert_eq!(copies, 0);
}
