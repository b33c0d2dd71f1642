use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sereal::{from_slice, to_vec, Decoder, Encoder, Value};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
struct Person {
    name: String,
    phone: String,
    siblings: i32,
    spouse: bool,
    money: f64,
}

fn mr_foo() -> Person {
    Person {
        name: "mr foo".into(),
        phone: "12345".into(),
        siblings: 10,
        spouse: true,
        money: 123.45,
    }
}

#[test]
fn struct_roundtrip() {
    let doc = to_vec(&mr_foo()).unwrap();
    let back: Person = from_slice(&doc).unwrap();
    assert_eq!(back, mr_foo());
}

#[test]
fn struct_decodes_into_mapping() {
    #[derive(Serialize)]
    struct Pair {
        name: String,
        phone: String,
    }

    let doc = to_vec(&Pair {
        name: "mr foo".into(),
        phone: "12345".into(),
    })
    .unwrap();

    let map: BTreeMap<String, String> = from_slice(&doc).unwrap();
    assert_eq!(map.get("name").map(String::as_str), Some("mr foo"));
    assert_eq!(map.get("phone").map(String::as_str), Some("12345"));
}

#[test]
fn renamed_and_skipped_fields() {
    // field names swapped on the wire, one field never serialized
    #[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
    struct Tagged {
        #[serde(rename = "phone")]
        name: String,
        #[serde(rename = "name")]
        phone: String,
        #[serde(skip)]
        siblings: i32,
    }

    let doc = to_vec(&Tagged {
        name: "12345".into(),
        phone: "mr foo".into(),
        siblings: 10,
    })
    .unwrap();

    #[derive(Deserialize, Debug, PartialEq, Default)]
    struct PlainNames {
        name: String,
        phone: String,
        #[serde(default)]
        siblings: i32,
    }

    let back: PlainNames = from_slice(&doc).unwrap();
    assert_eq!(
        back,
        PlainNames {
            name: "mr foo".into(),
            phone: "12345".into(),
            siblings: 0,
        }
    );
}

#[test]
fn unknown_mapping_keys_are_discarded() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Narrow {
        phone: String,
    }

    let doc = to_vec(&mr_foo()).unwrap();
    let narrow: Narrow = from_slice(&doc).unwrap();
    assert_eq!(narrow.phone, "12345");
}

#[test]
fn omitted_empty_fields() {
    #[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
    struct OmitEmpty {
        #[serde(skip_serializing_if = "String::is_empty", default)]
        name: String,
        #[serde(skip_serializing_if = "String::is_empty", default)]
        phone: String,
    }

    let half = OmitEmpty {
        name: String::new(),
        phone: "12345".into(),
    };
    let doc = to_vec(&half).unwrap();

    let as_map: HashMap<String, String> = from_slice(&doc).unwrap();
    assert_eq!(as_map.len(), 1);
    assert_eq!(as_map.get("phone").map(String::as_str), Some("12345"));

    let back: OmitEmpty = from_slice(&doc).unwrap();
    assert_eq!(back, half);
}

#[test]
fn struct_as_map_matches_plain_mapping() {
    #[derive(Serialize)]
    struct Point {
        x: i64,
        y: i64,
    }

    let mut plain = Encoder::new();
    let mut as_map = Encoder::new();
    as_map.struct_as_map = true;

    let from_struct = as_map.marshal(&Point { x: 3, y: 4 }).unwrap();
    let mut mapping = BTreeMap::new();
    mapping.insert("x".to_string(), 3i64);
    mapping.insert("y".to_string(), 4i64);
    let from_map = plain.marshal(&mapping).unwrap();

    let decoder = Decoder::new();
    let a: BTreeMap<String, i64> = decoder.unmarshal(&from_struct).unwrap();
    let b: BTreeMap<String, i64> = decoder.unmarshal(&from_map).unwrap();
    assert_eq!(a, b);

    // without the option the struct travels as a class-tagged object
    let tagged = plain.marshal(&Point { x: 3, y: 4 }).unwrap();
    match decoder.decode(&tagged).unwrap() {
        Value::Object(obj) => assert_eq!(obj.class, "Point"),
        other => panic!("expected an object, got {other:?}"),
    }
    match decoder.decode(&from_struct).unwrap() {
        Value::Hash(pairs) => assert_eq!(pairs.len(), 2),
        other => panic!("expected a hash, got {other:?}"),
    }
}

#[test]
fn nested_structs_and_pointers() {
    #[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
    struct Inner {
        person: Person,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
    struct Outer {
        inner: Inner,
        extra: Option<Box<Person>>,
    }

    let value = Outer {
        inner: Inner { person: mr_foo() },
        extra: Some(Box::new(mr_foo())),
    };
    let doc = to_vec(&value).unwrap();
    let back: Outer = from_slice(&doc).unwrap();
    assert_eq!(back, value);

    let none = Outer {
        inner: Inner {
            person: Person::default(),
        },
        extra: None,
    };
    let doc = to_vec(&none).unwrap();
    let back: Outer = from_slice(&doc).unwrap();
    assert_eq!(back, none);
}

#[test]
fn slices_of_structs() {
    let people = vec![mr_foo(), Person::default(), mr_foo()];
    let doc = to_vec(&people).unwrap();
    let back: Vec<Person> = from_slice(&doc).unwrap();
    assert_eq!(back, people);
}

#[test]
fn fixed_length_target_discards_extra_elements() {
    let doc = to_vec(&[1i64, 2, 3, 4, 5]).unwrap();
    let short: [i64; 3] = from_slice(&doc).unwrap();
    assert_eq!(short, [1, 2, 3]);

    // the stream must stay aligned after the discarded tail
    let pairs = vec![(vec![1i64, 2, 3, 4], "after".to_string())];
    let doc = to_vec(&pairs).unwrap();
    let back: Vec<([i64; 2], String)> = from_slice(&doc).unwrap();
    assert_eq!(back, vec![([1, 2], "after".to_string())]);
}

#[test]
fn fixed_length_target_longer_than_wire_fails() {
    let doc = to_vec(&[1i64, 2, 3]).unwrap();
    let result: Result<[i64; 8], _> = from_slice(&doc);
    assert!(result.is_err());
}

#[test]
fn undef_into_scalar_is_a_shape_mismatch() {
    let doc = sereal::encode(&Value::Null).unwrap();
    let result: Result<i64, _> = from_slice(&doc);
    assert!(result.is_err());

    let optional: Option<i64> = from_slice(&doc).unwrap();
    assert_eq!(optional, None);
}

#[test]
fn byte_string_feeds_byte_sequence_targets() {
    let doc = sereal::encode(&Value::Bytes(b"payload".to_vec())).unwrap();
    let bytes: Vec<u8> = from_slice(&doc).unwrap();
    assert_eq!(bytes, b"payload");

    let doc = sereal::encode(&Value::Str("text".into())).unwrap();
    let bytes: Vec<u8> = from_slice(&doc).unwrap();
    assert_eq!(bytes, b"text");
}

#[test]
fn deduplicated_byte_strings_reach_byte_targets() {
    // the second occurrence travels as COPY and must still feed Vec<u8>
    let doc = sereal::encode(&Value::Array(vec![
        Value::Bytes(b"payload".to_vec()),
        Value::Bytes(b"payload".to_vec()),
    ]))
    .unwrap();
    let back: Vec<Vec<u8>> = from_slice(&doc).unwrap();
    assert_eq!(back, vec![b"payload".to_vec(), b"payload".to_vec()]);
}

#[test]
fn integer_width_coercions() {
    let doc = to_vec(&42u8).unwrap();
    assert_eq!(from_slice::<u64>(&doc).unwrap(), 42);
    assert_eq!(from_slice::<i16>(&doc).unwrap(), 42);

    let doc = to_vec(&-300i64).unwrap();
    assert_eq!(from_slice::<i32>(&doc).unwrap(), -300);
    assert!(from_slice::<u32>(&doc).is_err());
}

#[test]
fn enums_roundtrip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect { w: i64, h: i64 },
    }

    for value in [
        Shape::Empty,
        Shape::Circle(2.5),
        Shape::Rect { w: 3, h: 4 },
    ] {
        let doc = to_vec(&value).unwrap();
        let back: Shape = from_slice(&doc).unwrap();
        assert_eq!(back, value);
    }
}

#[test]
fn regexp_travels_through_the_typed_path() {
    let re = sereal::Regexp {
        pattern: b"^ab+c$".to_vec(),
        modifiers: b"im".to_vec(),
    };
    let doc = to_vec(&re).unwrap();
    assert_eq!(doc[6], sereal::constants::TAG_REGEXP);

    let back: sereal::Regexp = from_slice(&doc).unwrap();
    assert_eq!(back, re);

    // the untyped reader sees the same regular expression
    match Decoder::new().decode(&doc).unwrap() {
        Value::Regexp(decoded) => assert_eq!(decoded, re),
        other => panic!("expected a regexp, got {other:?}"),
    }
}

#[test]
fn typed_header_and_body() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Meta {
        schema: u32,
    }

    let mut encoder = Encoder::new();
    let doc = encoder
        .marshal_header_body(Some(&Meta { schema: 7 }), &vec!["x".to_string()])
        .unwrap();

    let decoder = Decoder::new();
    let (meta, body): (Option<Meta>, Vec<String>) = decoder.unmarshal_header_body(&doc).unwrap();
    assert_eq!(meta, Some(Meta { schema: 7 }));
    assert_eq!(body, vec!["x"]);
}

#[test]
fn mapping_keys_must_be_strings() {
    let mut bad = HashMap::new();
    bad.insert(5i32, "five");
    assert!(to_vec(&bad).is_err());
}

#[test]
fn compat_mode_documents_decode_into_typed_targets() {
    let mut encoder = Encoder::new();
    encoder.compat_mode = true;
    let doc = encoder.marshal(&vec![mr_foo()]).unwrap();

    let back: Vec<Person> = from_slice(&doc).unwrap();
    assert_eq!(back, vec![mr_foo()]);
}
