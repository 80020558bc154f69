use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use spore::{from_str, to_string, Freeze, Spore, SporeBuilder, Thaw};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product {}", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

fn sample_user() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let user = sample_user();

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let frozen = "{|123_|_Alice_|_alice@example.com_|_true|}";

    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(frozen)))
    });
}

fn benchmark_serialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_array");

    for size in [10, 50, 100, 500].iter() {
        let products = products(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&products)))
        });
    }
    group.finish();
}

fn benchmark_deserialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_array");

    for size in [10, 50, 100, 500].iter() {
        let frozen = to_string(&products(*size)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &frozen, |b, frozen| {
            b.iter(|| from_str::<Vec<Product>>(black_box(frozen)))
        });
    }
    group.finish();
}

fn benchmark_decode_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_tree");

    for depth in [4, 16, 64].iter() {
        let mut frozen = "leaf".to_string();
        for level in 0..*depth {
            frozen = format!("{{|{}_|_{}|}}", level, frozen);
        }

        group.bench_with_input(BenchmarkId::from_parameter(depth), &frozen, |b, frozen| {
            b.iter(|| Spore::from_frozen(black_box(frozen)))
        });
    }
    group.finish();
}

fn benchmark_builder_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder_reader");
    let tags: Vec<String> = (0..20).map(|i| format!("tag{}", i)).collect();

    group.bench_function("build", |b| {
        b.iter(|| {
            SporeBuilder::with_version("1")
                .append(black_box("name"))
                .append(black_box(&42i64))
                .append_as_collection(Some(black_box(&tags)), |tag| tag.freeze())
                .build()
        })
    });

    let spore = SporeBuilder::with_version("1")
        .append("name")
        .append(&42i64)
        .append_as_collection(Some(&tags), |tag| tag.freeze())
        .build();

    group.bench_function("read", |b| {
        b.iter(|| {
            let mut reader = black_box(&spore).reader();
            let name = reader.next_as_string().unwrap();
            let count = reader.next_as_i64().unwrap();
            let tags = reader.next_as_list(String::thaw).unwrap();
            (name, count, tags)
        })
    });

    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let user = sample_user();

    let mut group = c.benchmark_group("comparison");

    group.bench_function("spore_serialize", |b| {
        b.iter(|| spore::to_string(black_box(&user)))
    });

    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&user)))
    });

    let spore_str = spore::to_string(&user).unwrap();
    let json_str = serde_json::to_string(&user).unwrap();

    group.bench_function("spore_deserialize", |b| {
        b.iter(|| spore::from_str::<User>(black_box(&spore_str)))
    });

    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<User>(black_box(&json_str)))
    });

    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let user = sample_user();

    c.bench_function("roundtrip_simple", |b| {
        b.iter(|| {
            let serialized = to_string(black_box(&user)).unwrap();
            let _deserialized: User = from_str(black_box(&serialized)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_serialize_array,
    benchmark_deserialize_array,
    benchmark_decode_tree,
    benchmark_builder_reader,
    benchmark_comparison_with_json,
    benchmark_roundtrip
);
criterion_main!(benches);
