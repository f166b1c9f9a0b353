use bitrecord::{
    bitfield::BitField,
    bits::RawBits,
    errors::{RecordError, ValidationError},
    field::{EnumSpec, Field},
    value::Value,
};

fn dns_header() -> BitField {
    let opcode = EnumSpec::new(4)
        .variant("QUERY", 0)
        .variant("IQUERY", 1)
        .variant("STATUS", 2)
        .variant("NOTIFY", 4)
        .variant("UPDATE", 5);

    let rcode = EnumSpec::new(4)
        .variant("NOERROR", 0)
        .variant("FORMERR", 1)
        .variant("SERVFAIL", 2)
        .variant("NXDOMAIN", 3)
        .variant("NOTIMP", 4)
        .variant("REFUSED", 5);

    BitField::compile(&[
        Field::uint("id", 16),
        Field::bool("qr").with_default(false),
        Field::enumeration("opcode", opcode).with_default(0u8),
        Field::bool("aa").with_default(false),
        Field::bool("tc").with_default(false),
        Field::bool("rd").with_default(false),
        Field::bool("ra").with_default(false),
        Field::padding("z", 3),
        Field::enumeration("rcode", rcode).with_default(0u8),
        Field::uint("qdcount", 16).with_default(0u16),
        Field::uint("ancount", 16).with_default(0u16),
        Field::uint("nscount", 16).with_default(0u16),
        Field::uint("arcount", 16).with_default(0u16),
    ])
    .unwrap()
}

fn raw96(value: u128) -> RawBits {
    RawBits::from_u128(96, value).unwrap()
}

#[test]
fn test_layout() {
    let header = dns_header();
    assert_eq!(header.total_bits(), 96);
    assert_eq!(header.schema().field("id").unwrap().shift, 80);
    assert_eq!(header.schema().field("rcode").unwrap().shift, 64);
    assert_eq!(header.schema().field("arcount").unwrap().shift, 0);
}

#[test]
fn test_encode_query() {
    let header = dns_header();
    let query = header
        .from_data([
            ("id", Value::U64(0xABCD)),
            ("rd", Value::Bool(true)),
            ("qdcount", Value::U64(1)),
        ])
        .unwrap();

    let raw = header.encode(&query).unwrap();
    assert_eq!(raw.to_u128(), Some(0xABCD_0100_0001_0000_0000_0000));
}

#[test]
fn test_decode_response() {
    let header = dns_header();
    let raw = RawBits::from_hex(96, "abcd_8183_0001_0000_0000_0000").unwrap();
    let response = header.decode(&raw).unwrap();

    assert_eq!(response.get_u64("id"), Some(0xABCD));
    assert_eq!(response.get_bool("qr"), Some(true));
    assert_eq!(response.label("opcode"), Some("QUERY"));
    assert_eq!(response.get_bool("rd"), Some(true));
    assert_eq!(response.get_bool("ra"), Some(true));
    assert_eq!(response.label("rcode"), Some("NXDOMAIN"));
    assert_eq!(response.get_u64("qdcount"), Some(1));
    assert_eq!(response.get_u64("ancount"), Some(0));

    assert_eq!(header.encode(&response).unwrap(), raw);
}

#[test]
fn test_reserved_bits_rejected() {
    let err = dns_header()
        .decode(&raw96(0xABCD_0140_0001_0000_0000_0000))
        .unwrap_err();

    assert_eq!(
        err,
        RecordError::Invalid {
            field: "z".to_string(),
            error: ValidationError::InvalidFieldValue,
        }
    );
}

#[test]
fn test_undeclared_opcode_decodes() {
    // Opcode 3 has no label; decoding must still succeed.
    let record = dns_header()
        .decode(&raw96(0x0001_1800_0000_0000_0000_0000))
        .unwrap();

    assert_eq!(record.get_u64("opcode"), Some(3));
    assert_eq!(record.label("opcode"), None);
}

#[test]
fn test_answer_from_query() {
    let header = dns_header();
    let query = header
        .from_data([("id", Value::U64(7)), ("rd", Value::Bool(true))])
        .unwrap();

    let answer = query
        .with("qr", true)
        .and_then(|r| r.with("ra", true))
        .and_then(|r| r.with("ancount", 2u16))
        .unwrap();

    // The original record is untouched.
    assert_eq!(query.get_bool("qr"), Some(false));
    assert_eq!(
        header.encode(&answer).unwrap().to_u128(),
        Some(0x0007_8180_0000_0002_0000_0000)
    );

    assert_eq!(
        query.with("z", 1u8).unwrap_err(),
        RecordError::Invalid {
            field: "z".to_string(),
            error: ValidationError::InvalidFieldValue,
        }
    );
    assert_eq!(
        query.with("ttl", 1u8).unwrap_err(),
        RecordError::UnknownField("ttl".to_string())
    );
}

#[test]
fn test_id_is_required() {
    assert_eq!(
        dns_header().defaults().unwrap_err(),
        RecordError::MissingField("id".to_string())
    );
}

#[test]
fn test_format() {
    let header = dns_header();
    let response = header
        .decode(&raw96(0xABCD_8183_0001_0000_0000_0000))
        .unwrap();

    let expected = "\
id = 43981
qr = true
opcode = 0 (QUERY)
aa = false
tc = false
rd = true
ra = true
z = 0
rcode = 3 (NXDOMAIN)
qdcount = 1
ancount = 0
nscount = 0
arcount = 0
";
    assert_eq!(header.format(&response), expected);
    assert_eq!(response.to_string(), expected);
}

#[test]
fn test_shared_between_threads() {
    let header = dns_header();

    std::thread::scope(|s| {
        for id in 0..4u64 {
            let header = &header;
            s.spawn(move || {
                let record = header.from_data([("id", Value::U64(id))]).unwrap();
                let raw = header.encode(&record).unwrap();
                assert_eq!(header.decode(&raw).unwrap(), record);
            });
        }
    });
}
