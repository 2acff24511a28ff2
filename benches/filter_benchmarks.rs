use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use salesdesk_core::{
    AssignmentFilter, EntityId, IdSet, Lead, LeadColumn, LeadFilter,
    services::filter_leads,
};

fn synthetic_pool(size: usize) -> Vec<Lead> {
    (0..size as i64)
        .map(|i| Lead {
            id: Some(EntityId::from_i64(i)),
            customer_id: Some(EntityId::from_i64(i / 2)),
            name: format!("Lead {i} Trading"),
            business: Some(format!("Business {}", i % 37)),
            email: Some(format!("lead{i}@example.com")),
            state: Some(if i % 3 == 0 { "Kerala" } else { "Punjab" }.to_string()),
            salesperson: if i % 4 == 0 {
                Some("Ravi".to_string())
            } else {
                Some("unassigned".to_string())
            },
            ..Lead::default()
        })
        .collect()
}

// The full predicate chain over growing pools; the pass must stay linear.
fn composite_filter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("lead_filter_composite");

    let mut ids = IdSet::new();
    for i in 0..500 {
        ids.insert(EntityId::from_i64(i));
    }
    let filter = LeadFilter {
        search_term: Some("trading".into()),
        assignment: Some(AssignmentFilter::Assigned),
        customer_ids: Some(ids),
        column_filters: vec![(LeadColumn::State, "kerala".into())],
    };

    for size in [1_000usize, 10_000] {
        let pool = synthetic_pool(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &pool, |b, pool| {
            b.iter(|| filter_leads(black_box(pool), black_box(&filter)));
        });
    }

    group.finish();
}

// Search-only pass, the most common interactive path.
fn search_only_benchmark(c: &mut Criterion) {
    let pool = synthetic_pool(10_000);
    let filter = LeadFilter::with_search("lead 42");

    c.bench_function("lead_filter_search_10k", |b| {
        b.iter(|| filter_leads(black_box(&pool), black_box(&filter)));
    });
}

criterion_group!(benches, composite_filter_benchmark, search_only_benchmark);
criterion_main!(benches);
