use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use standings::outcome::{MatchOutcome, MatchRecord, Stage, normalize_all};
use standings::{aggregate, rank};
use std::hint::black_box;

/// Double round robin between `n_teams` teams with deterministic scores
fn round_robin(n_teams: usize) -> Vec<MatchOutcome> {
    let mut outcomes = Vec::with_capacity(n_teams * n_teams);

    for home in 0..n_teams {
        for away in 0..n_teams {
            if home == away {
                continue;
            }
            outcomes.push(MatchOutcome::completed(
                format!("m{home}-{away}"),
                Stage::RegularSeason,
                format!("team{home:03}"),
                format!("team{away:03}"),
                ((home * 7 + away * 3) % 5) as u32,
                ((home * 2 + away * 5) % 4) as u32,
            ));
        }
    }

    outcomes
}

/// Benchmark aggregation alone across league sizes
fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for n_teams in [8, 20, 64] {
        let outcomes = round_robin(n_teams);
        group.bench_with_input(BenchmarkId::from_parameter(n_teams), &outcomes, |b, o| {
            b.iter(|| aggregate(black_box(o)));
        });
    }

    group.finish();
}

/// Benchmark aggregate + rank, the uncached query path minus I/O
fn bench_aggregate_and_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_and_rank");

    for n_teams in [8, 20, 64] {
        let outcomes = round_robin(n_teams);
        group.bench_with_input(BenchmarkId::from_parameter(n_teams), &outcomes, |b, o| {
            b.iter(|| aggregate(black_box(o)).map(rank));
        });
    }

    group.finish();
}

/// Benchmark normalization of stored documents mixing both score schemes
fn bench_normalize(c: &mut Criterion) {
    let records: Vec<MatchRecord> = (0..380)
        .map(|i| {
            let legacy = i % 3 == 0;
            MatchRecord {
                id: format!("m{i}"),
                stage: "regular_season".to_string(),
                home_team_id: format!("team{:02}", i % 20),
                away_team_id: format!("team{:02}", (i + 1) % 20),
                status: "completed".to_string(),
                home_team_score: (!legacy).then_some(2),
                away_team_score: (!legacy).then_some(1),
                home_score: legacy.then_some(0),
                away_score: legacy.then_some(0),
                ..Default::default()
            }
        })
        .collect();

    c.bench_function("normalize_380_records", |b| {
        b.iter(|| normalize_all(black_box(&records)));
    });
}

criterion_group!(
    benches,
    bench_aggregate,
    bench_aggregate_and_rank,
    bench_normalize
);
criterion_main!(benches);
