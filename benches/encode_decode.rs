use bitrecord::{
    bitfield::BitField,
    field::{Field, IntSpec},
    record::Record,
    value::Value,
};
use criterion::{Criterion, criterion_group, criterion_main};

fn build_bitfield(field_count: usize) -> BitField {
    let mut fields = Vec::with_capacity(field_count);

    for i in 0..field_count {
        fields.push(Field::new(format!("f{}", i), IntSpec::unsigned(16).max(0xFFF0)));
    }

    BitField::compile(&fields).unwrap()
}

fn build_record(bitfield: &BitField, field_count: usize) -> Record {
    // Deterministic but non-trivial pattern
    let data: Vec<(String, Value)> = (0..field_count)
        .map(|i| (format!("f{}", i), Value::U64((i as u64 * 7919) % 0xFFF0)))
        .collect();

    bitfield.from_data(data).unwrap()
}

fn bench_encode_decode(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let bitfield = build_bitfield(field_count);
        let record = build_record(&bitfield, field_count);
        let raw = bitfield.encode(&record).unwrap();

        c.bench_function(&format!("decode_{}_fields", field_count), |b| {
            b.iter(|| {
                let _ = bitfield.decode(&raw).unwrap();
            })
        });

        c.bench_function(&format!("encode_{}_fields", field_count), |b| {
            b.iter(|| {
                let _ = bitfield.encode(&record).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_encode_decode);
criterion_main!(benches);
