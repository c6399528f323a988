use criterion::{Criterion, black_box, criterion_group, criterion_main};
use css::{CssTokenKind, tokenize};

const SMALL_RULES: usize = 64;
const LARGE_RULES: usize = 20_000;

fn make_rules(n: usize) -> String {
    let mut out = String::with_capacity(n * 48);
    for i in 0..n {
        out.push_str(&format!(
            ".c{i}, #id{i} > a {{ color: #fff; margin: 0 {i}px; width: 50%; }}\n"
        ));
    }
    out
}

fn bench_tokenize_small(c: &mut Criterion) {
    let input = make_rules(SMALL_RULES);
    c.bench_function("bench_css_tokenize_small", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&input));
            black_box(tokens.len());
        });
    });
}

fn bench_tokenize_large(c: &mut Criterion) {
    let input = make_rules(LARGE_RULES);
    c.bench_function("bench_css_tokenize_large", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&input));
            let shared = tokens
                .iter()
                .filter(|t| matches!(t.kind(), CssTokenKind::Whitespace | CssTokenKind::Comma))
                .count();
            black_box(shared);
        });
    });
}

criterion_group!(benches, bench_tokenize_small, bench_tokenize_large);
criterion_main!(benches);
