use std::fmt::Write;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use interviewkit_core::bank::QuestionBank;
use interviewkit_core::parser::{parse_bank_str, validate_bank};

const SMALL: &str = r#"
[bank]
id = "bench"
name = "Bench bank"

[[questions]]
role = "backend"
id = "b-1"
category = "technical"
prompt = "What is a connection pool?"
difficulty = "easy"
hints = ["Reuse", "Limits"]
expected_keywords = ["pool", "connection", "reuse"]
"#;

fn large_bank() -> String {
    let mut s = String::from("[bank]\nid = \"large\"\nname = \"Large\"\n");
    for i in 0..200 {
        let role = ["frontend", "backend", "fullstack", "data", "ml"][i % 5];
        let _ = write!(
            s,
            "\n[[questions]]\nrole = \"{role}\"\nid = \"q-{i}\"\ncategory = \"coding\"\nprompt = \"Question {i}\"\nexpected_keywords = [\"alpha\", \"beta\", \"gamma\"]\n"
        );
    }
    s
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_bank");
    let path = Path::new("bench.toml");
    let large = large_bank();

    group.bench_function("small", |b| {
        b.iter(|| parse_bank_str(black_box(SMALL), path))
    });

    group.bench_function("large", |b| {
        b.iter(|| parse_bank_str(black_box(&large), path))
    });

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let bank = QuestionBank::builtin();
    c.bench_function("validate_builtin", |b| {
        b.iter(|| validate_bank(black_box(&bank)))
    });
}

criterion_group!(benches, bench_parse, bench_validate);
criterion_main!(benches);
