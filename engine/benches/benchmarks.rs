//! Performance benchmarks for basket-engine

use basket_engine::{
    Collection, CollectionItem, CollectionKind, CollectionSnapshot, Mutation, ProductSnapshot,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn product(id: usize) -> ProductSnapshot {
    ProductSnapshot::new(format!("product_{id}"), format!("Product {id}"), 9.99)
        .with_discount((id % 4) as f64 * 10.0)
}

fn filled_cart(size: usize) -> Collection {
    Collection::from_items(
        CollectionKind::Cart,
        (0..size).map(|i| CollectionItem::from_snapshot(product(i), 1 + (i % 3) as u32, i as u64)),
    )
}

fn bench_mutations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutations");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("add_new", size), size, |b, &size| {
            let base = filled_cart(size);
            let add = Mutation::add(product(size + 1), 1).unwrap();
            b.iter(|| {
                let mut cart = base.clone();
                cart.apply(black_box(&add), black_box(1000))
            })
        });

        group.bench_with_input(BenchmarkId::new("bump_existing", size), size, |b, &size| {
            let mut cart = filled_cart(size);
            let add = Mutation::add(product(size / 2), 1).unwrap();
            b.iter(|| cart.apply(black_box(&add), black_box(1000)))
        });

        group.bench_with_input(BenchmarkId::new("set_quantity", size), size, |b, &size| {
            let mut cart = filled_cart(size);
            let mut quantity = 0i64;
            b.iter(|| {
                quantity = quantity % 50 + 1;
                let update = Mutation::set_quantity(format!("product_{}", size - 1), quantity).unwrap();
                cart.apply(black_box(&update), black_box(1000))
            })
        });
    }

    group.finish();
}

fn bench_from_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_listing");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("fold_duplicates", size), size, |b, &size| {
            // Every product appears twice, as in a listing with repeated rows.
            let rows: Vec<CollectionItem> = (0..size * 2)
                .map(|i| CollectionItem::from_snapshot(product(i % size), 1, i as u64))
                .collect();
            b.iter(|| Collection::from_items(CollectionKind::Cart, black_box(rows.clone())))
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("to_json", size), size, |b, &size| {
            let cart = filled_cart(size);
            b.iter(|| CollectionSnapshot::of(black_box(&cart)).to_json().unwrap())
        });

        group.bench_with_input(BenchmarkId::new("from_json", size), size, |b, &size| {
            let json = CollectionSnapshot::of(&filled_cart(size)).to_json().unwrap();
            b.iter(|| {
                CollectionSnapshot::from_json(black_box(&json))
                    .and_then(|s| s.into_collection(CollectionKind::Cart))
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mutations, bench_from_listing, bench_snapshot);

criterion_main!(benches);
