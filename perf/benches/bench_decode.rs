use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use shijim_perf::{make_book_frame, make_quote_frame, make_trade_frame};
use shijim_sbe::{MessageHeader, SbeMessage, SchemaRegistry};

fn bench_header_peek(c: &mut Criterion) {
    let frame = make_quote_frame();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("header peek", |b| {
        b.iter(|| MessageHeader::peek(black_box(&frame)).unwrap());
    });

    group.finish();
}

fn bench_quote_decode(c: &mut Criterion) {
    let frame = make_quote_frame();
    let mut registry = SchemaRegistry::market_data_v1();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("quote", |b| {
        b.iter(|| registry.decode(black_box(&frame)).unwrap());
    });

    group.finish();
}

fn bench_trade_decode(c: &mut Criterion) {
    let frame = make_trade_frame();
    let mut registry = SchemaRegistry::market_data_v1();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("trade", |b| {
        b.iter(|| registry.decode(black_box(&frame)).unwrap());
    });

    group.finish();
}

fn bench_book_walk(c: &mut Criterion) {
    let frame = make_book_frame(6);
    let mut registry = SchemaRegistry::market_data_v1();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("book walk (6 levels)", |b| {
        b.iter(|| {
            let msg = registry.decode(black_box(&frame)).unwrap();
            if let SbeMessage::Book(book) = msg {
                for entry in book.entries {
                    black_box(entry.unwrap());
                }
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_header_peek,
    bench_quote_decode,
    bench_trade_decode,
    bench_book_walk
);
criterion_main!(benches);
