use sereal::{Decoder, Encoder, Error, Value};

const V2_PREFIX: [u8; 6] = [0x3d, 0x73, 0x72, 0x6c, 0x02, 0x00];

fn v2_doc(body: &[u8]) -> Vec<u8> {
    let mut doc = V2_PREFIX.to_vec();
    doc.extend_from_slice(body);
    doc
}

fn body_of(doc: &[u8]) -> &[u8] {
    &doc[6..]
}

#[test]
fn scalar_wire_bytes() {
    let mut encoder = Encoder::new();

    assert_eq!(body_of(&encoder.encode(&Value::Integer(0)).unwrap()), [0x00]);
    assert_eq!(body_of(&encoder.encode(&Value::Integer(15)).unwrap()), [0x0f]);
    assert_eq!(body_of(&encoder.encode(&Value::Integer(-1)).unwrap()), [0x1f]);
    assert_eq!(
        body_of(&encoder.encode(&Value::Integer(-16)).unwrap()),
        [0x10]
    );
    assert_eq!(
        body_of(&encoder.encode(&Value::Integer(16)).unwrap()),
        [0x20, 0x10]
    );
    assert_eq!(
        body_of(&encoder.encode(&Value::Integer(-17)).unwrap()),
        [0x21, 0x21]
    );
    assert_eq!(
        body_of(&encoder.encode(&Value::Integer(300)).unwrap()),
        [0x20, 0xac, 0x02]
    );

    assert_eq!(body_of(&encoder.encode(&Value::Bool(true)).unwrap()), [0x3b]);
    assert_eq!(
        body_of(&encoder.encode(&Value::Bool(false)).unwrap()),
        [0x3a]
    );
    assert_eq!(body_of(&encoder.encode(&Value::Null).unwrap()), [0x25]);
    assert_eq!(
        body_of(&encoder.encode(&Value::CanonicalNull).unwrap()),
        [0x39]
    );

    assert_eq!(
        body_of(&encoder.encode(&Value::Str("foo".into())).unwrap()),
        [0x27, 0x03, b'f', b'o', b'o']
    );
    assert_eq!(
        body_of(&encoder.encode(&Value::Bytes(b"ab".to_vec())).unwrap()),
        [0x62, b'a', b'b']
    );

    let float = encoder.encode(&Value::Float(2.2)).unwrap();
    assert_eq!(body_of(&float)[0], 0x22);
    assert_eq!(&body_of(&float)[1..], 2.2f32.to_le_bytes());

    let double = encoder.encode(&Value::Double(2.2)).unwrap();
    assert_eq!(body_of(&double)[0], 0x23);
    assert_eq!(&body_of(&double)[1..], 2.2f64.to_le_bytes());
}

#[test]
fn inline_arrayref_and_hashref_decode() {
    let decoder = Decoder::new();

    // ARRAYREF_2 with elements 1 and 2
    let doc = v2_doc(&[0x42, 0x01, 0x02]);
    assert_eq!(
        decoder.decode(&doc).unwrap(),
        Value::Array(vec![Value::Integer(1), Value::Integer(2)])
    );

    // HASHREF_1 {"a": 5}, key as SHORT_BINARY_1
    let doc = v2_doc(&[0x51, 0x61, b'a', 0x05]);
    assert_eq!(
        decoder.decode(&doc).unwrap(),
        Value::Hash(vec![("a".to_string(), Value::Integer(5))])
    );

    // compatibility decoders see the inline forms as references
    let mut compat_decoder = Decoder::new();
    compat_decoder.compat_mode = true;
    let doc = v2_doc(&[0x42, 0x01, 0x02]);
    assert!(matches!(
        compat_decoder.decode(&doc).unwrap(),
        Value::Ref(_)
    ));
}

#[test]
fn pad_bytes_are_skipped_anywhere() {
    let decoder = Decoder::new();

    let doc = v2_doc(&[0x3f, 0x3f, 0x05]);
    assert_eq!(decoder.decode(&doc).unwrap(), Value::Integer(5));

    // pads between array elements
    let doc = v2_doc(&[0x42, 0x3f, 0x01, 0x3f, 0x02]);
    assert_eq!(
        decoder.decode(&doc).unwrap(),
        Value::Array(vec![Value::Integer(1), Value::Integer(2)])
    );
}

#[test]
fn tracked_refp_resolves_to_shared_value() {
    // [REFN+ARRAY[5], REFP -> the tracked REFN]
    let body = [0x2b, 0x02, 0xa8, 0x2b, 0x01, 0x05, 0x29, 0x03];
    let doc = v2_doc(&body);

    let decoder = Decoder::new();
    let expected_inner = Value::Array(vec![Value::Integer(5)]);
    assert_eq!(
        decoder.decode(&doc).unwrap(),
        Value::Array(vec![expected_inner.clone(), expected_inner])
    );

    let mut compat_decoder = Decoder::new();
    compat_decoder.compat_mode = true;
    match compat_decoder.decode(&doc).unwrap() {
        Value::Array(items) => {
            assert!(matches!(items[0], Value::Ref(_)));
            assert!(matches!(items[1], Value::Ref(_)));
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn refp_to_untracked_offset_fails() {
    let body = [0x2b, 0x02, 0x2b, 0x01, 0x05, 0x29, 0x03];
    let doc = v2_doc(&body);
    assert!(matches!(
        Decoder::new().decode(&doc),
        Err(Error::UntrackedOffsetRefp)
    ));
}

#[test]
fn alias_to_untracked_offset_fails() {
    let body = [0x2b, 0x02, 0x2b, 0x01, 0x05, 0x2e, 0x03];
    let doc = v2_doc(&body);
    assert!(matches!(
        Decoder::new().decode(&doc),
        Err(Error::UntrackedOffsetAlias)
    ));
}

#[test]
fn alias_shares_the_tracked_cell_value() {
    // [tracked 5, ALIAS -> it]
    let body = [0x2b, 0x02, 0x85, 0x2e, 0x03];
    let doc = v2_doc(&body);
    assert_eq!(
        Decoder::new().decode(&doc).unwrap(),
        Value::Array(vec![Value::Integer(5), Value::Integer(5)])
    );
}

#[test]
fn nested_copy_is_rejected() {
    // elem1: "a"; elem2: COPY -> elem1; elem3: COPY -> elem2 (a COPY tag)
    let body = [0x2b, 0x03, 0x61, b'a', 0x2f, 0x03, 0x2f, 0x05];
    let doc = v2_doc(&body);
    assert!(matches!(
        Decoder::new().decode(&doc),
        Err(Error::NestedCopy)
    ));
}

#[test]
fn forward_copy_offset_is_rejected() {
    let body = [0x2f, 0x7f];
    let doc = v2_doc(&body);
    assert!(matches!(
        Decoder::new().decode(&doc),
        Err(Error::CorruptOffset)
    ));
}

#[test]
fn unknown_and_reserved_tags_are_rejected() {
    for tag in [0x34u8, 0x3c, 0x3e] {
        let doc = v2_doc(&[tag]);
        assert!(
            matches!(Decoder::new().decode(&doc), Err(Error::UnknownTag(t)) if t == tag),
            "tag 0x{tag:02x}"
        );
    }
}

#[test]
fn truncated_documents_are_rejected() {
    let cases: &[&[u8]] = &[
        &[],                      // empty body
        &[0x2b, 0x05],            // array promising five elements
        &[0x26, 0x05, b'a'],      // binary promising five bytes
        &[0x2a, 0x02, 0x61, b'a'], // hash promising two pairs
        &[0x22, 0x00, 0x00],      // float needs four bytes
        &[0x23, 0x00],            // double needs eight bytes
        &[0x64, b'a', b'b'],      // short binary promising four bytes
    ];
    for body in cases {
        let doc = v2_doc(body);
        assert!(
            matches!(Decoder::new().decode(&doc), Err(Error::Truncated)),
            "body {body:02x?}"
        );
    }
}

#[test]
fn corrupt_varints_are_rejected() {
    // VARINT running off the end of the buffer
    let doc = v2_doc(&[0x20, 0xff, 0xff]);
    assert!(matches!(
        Decoder::new().decode(&doc),
        Err(Error::CorruptVarint)
    ));

    // continuation chain longer than a u64 can hold
    let doc = v2_doc(&[
        0x20, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01,
    ]);
    assert!(matches!(
        Decoder::new().decode(&doc),
        Err(Error::CorruptVarint)
    ));
}

#[test]
fn hash_key_must_be_stringish() {
    // HASH with an integer where a key belongs
    let body = [0x2a, 0x01, 0x05, 0x05];
    let doc = v2_doc(&body);
    assert!(matches!(
        Decoder::new().decode(&doc),
        Err(Error::ExpectedString(_))
    ));
}

#[test]
fn varint_interpreted_as_unsigned_when_sign_bit_lands() {
    let mut encoder = Encoder::new();
    let doc = encoder
        .encode(&Value::UInteger(0xdbbc_596c_2439_6f18))
        .unwrap();
    assert_eq!(
        Decoder::new().decode(&doc).unwrap(),
        Value::UInteger(0xdbbc_596c_2439_6f18)
    );
}
