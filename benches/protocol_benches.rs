use criterion::{black_box, criterion_group, criterion_main, Criterion};

use aquos_rc::{encode_query, encode_write, Operation, Reply};

fn bench_encode(c: &mut Criterion) {
    c.bench_function("encode_write_volume", |b| {
        b.iter(|| encode_write(black_box(Operation::Volume), black_box(42)).unwrap().to_bytes())
    });
    c.bench_function("encode_write_remote_button", |b| {
        b.iter(|| encode_write(black_box(Operation::RemoteButton), black_box(55)).unwrap())
    });
    c.bench_function("encode_query_all", |b| {
        b.iter(|| {
            Operation::ALL
                .iter()
                .filter_map(|op| encode_query(*op).ok())
                .count()
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    c.bench_function("decode_integer", |b| {
        b.iter(|| Reply::parse(black_box("35 ")).into_value(Operation::Volume).unwrap())
    });
    c.bench_function("decode_ack", |b| {
        b.iter(|| Reply::parse(black_box("OK")).into_ack(Operation::Power).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
