use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use where_rule_group::lexer::Lexer;
use where_rule_group::parser::Parser;
use where_rule_group::sql_formatter::SqlFormatter;
use where_rule_group::{transform, transform_node, FieldDescriptor};

fn test_cases() -> Vec<(&'static str, &'static str)> {
    vec![
        ("simple", "field1 > 10"),
        ("medium", "country IN ('USA', 'Canada') AND status NOT IN ('inactive', 'banned') AND field2 IS NOT NULL"),
        ("complex", "(field1 > 10 OR field2 < 5) AND (score BETWEEN 50 AND 100 OR name LIKE 'John%')"),
        (
            "expressions",
            "score > COALESCE(discounted_price, CASE WHEN field1 = 'electronics' THEN 100 ELSE 50 END) AND (field1 + field2) * 2 < 100",
        ),
    ]
}

// 字段描述
fn field_sources() -> Vec<FieldDescriptor> {
    ["field1", "field2", "score", "country", "status", "name"]
        .into_iter()
        .map(FieldDescriptor::new)
        .collect()
}

// 基准测试：词法分析性能
fn benchmark_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_performance");

    for (name, sql) in test_cases() {
        group.bench_with_input(BenchmarkId::new("tokenize", name), &sql, |b, &sql| {
            b.iter(|| {
                let tokens: Vec<_> = Lexer::new(black_box(sql)).collect();
                black_box(tokens)
            })
        });
    }

    group.finish();
}

// 基准测试：语法分析性能
fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_performance");

    for (name, sql) in test_cases() {
        // 预先词法分析
        let tokens: Vec<_> = Lexer::new(sql).collect();

        group.bench_with_input(BenchmarkId::new("parse", name), &tokens, |b, tokens| {
            b.iter(|| {
                let mut parser = Parser::new(black_box(tokens));
                match parser.parse() {
                    Ok(ast) => black_box(ast),
                    Err(_) => panic!("解析失败"),
                }
            })
        });
    }

    group.finish();
}

// 基准测试：AST → RuleGroup
fn benchmark_rule_builder(c: &mut Criterion) {
    let fields = field_sources();
    let mut group = c.benchmark_group("rule_builder_performance");

    for (name, sql) in test_cases() {
        let tokens: Vec<_> = Lexer::new(sql).collect();
        let mut parser = Parser::new(&tokens);
        let ast = parser.parse().expect("解析应该成功");

        group.bench_with_input(BenchmarkId::new("build", name), &ast, |b, ast| {
            b.iter(|| {
                match transform_node(black_box(ast.as_ref()), Some(fields.as_slice())) {
                    Ok(result) => black_box(result),
                    Err(_) => panic!("转换失败"),
                }
            })
        });
    }

    group.finish();
}

// 基准测试：完整的端到端处理（含回转 SQL）
fn benchmark_end_to_end(c: &mut Criterion) {
    let fields = field_sources();
    let formatter = SqlFormatter::new();
    let mut group = c.benchmark_group("end_to_end_performance");

    for (name, sql) in test_cases() {
        group.bench_with_input(BenchmarkId::new("full_pipeline", name), &sql, |b, &sql| {
            b.iter(|| {
                let rule_group = transform(black_box(sql), Some(fields.as_slice())).expect("转换应该成功");
                let round_trip = formatter.format(&rule_group).expect("回转应该成功");
                black_box(round_trip)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_lexer,
    benchmark_parser,
    benchmark_rule_builder,
    benchmark_end_to_end
);
criterion_main!(benches);
