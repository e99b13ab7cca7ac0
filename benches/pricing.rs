//! Benchmarks for the pricing engine.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use leazo_booking::pricing::Quote;
use leazo_booking::types::{Amount, BookingForm, BookingRequest, GameSelection};
use serde_json::json;

fn request(plan: &str) -> BookingRequest {
    serde_json::from_value::<BookingForm>(json!({
        "plan": plan,
        "hours": 4,
        "games": [],
        "addController": true,
        "bookingDate": "2026-10-20",
        "name": "Bench",
        "phone": "9999999999",
        "address": "Bench Street",
        "city": "Mandsaur",
        "coupon": "leazo",
        "paymentMethod": "upi"
    }))
    .expect("valid form")
    .validate()
    .expect("complete form")
}

fn bench_quote_games(c: &mut Criterion) {
    let mut group = c.benchmark_group("quote_games");

    for size in [0, 5, 50].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut req = request("night");
            req.games = (0..size)
                .map(|i| {
                    GameSelection::new(format!("Game {}", i), Amount::rupees((i as i64 * 37) % 300))
                })
                .collect();

            b.iter(|| {
                black_box(Quote::compute(black_box(&req)).ok());
            });
        });
    }

    group.finish();
}

fn bench_quote_plans(c: &mut Criterion) {
    let mut group = c.benchmark_group("quote_plans");

    for plan in ["hourly", "day", "night"] {
        group.bench_with_input(BenchmarkId::from_parameter(plan), plan, |b, plan| {
            let req = request(plan);
            b.iter(|| {
                black_box(Quote::compute(black_box(&req)).ok());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_quote_games, bench_quote_plans);
criterion_main!(benches);
