use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizsmith_core::difficulty::Difficulty;
use quizsmith_core::report::{top_missed_concepts, QuestionOutcome};

fn outcomes(n: usize) -> Vec<QuestionOutcome> {
    (0..n)
        .map(|i| QuestionOutcome {
            text: format!("Question {i}?"),
            submitted: "a".into(),
            expected: "b".into(),
            correct: i % 3 == 0,
            explanation: String::new(),
            concepts: vec![
                format!("concept-{}", i % 7),
                format!("concept-{}", i % 11),
            ],
            elapsed_ms: 900,
            difficulty_after: Difficulty::Medium,
        })
        .collect()
}

fn bench_top_missed(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_missed_concepts");

    let small = outcomes(10);
    let medium = outcomes(100);
    let large = outcomes(1000);

    group.bench_function("10_outcomes", |b| {
        b.iter(|| top_missed_concepts(black_box(&small)))
    });
    group.bench_function("100_outcomes", |b| {
        b.iter(|| top_missed_concepts(black_box(&medium)))
    });
    group.bench_function("1000_outcomes", |b| {
        b.iter(|| top_missed_concepts(black_box(&large)))
    });

    group.finish();
}

criterion_group!(benches, bench_top_missed);
criterion_main!(benches);
