use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jobportal_core::{classify_response, field_errors, AttemptOutcome};
use serde_json::json;

fn job_list_body(count: usize) -> Vec<u8> {
    let jobs: Vec<_> = (0..count)
        .map(|idx| {
            json!({
                "_id": format!("job-{idx}"),
                "title": "Backend Engineer",
                "description": "Design and run the portal API",
                "status": "open",
                "salaryMin": 90_000,
                "salaryMax": 120_000
            })
        })
        .collect();
    serde_json::to_vec(&json!({"data": jobs, "total": count, "page": 1, "pages": 1}))
        .unwrap_or_default()
}

fn validation_body() -> Vec<u8> {
    let errors: Vec<_> =
        (0..12).map(|idx| json!({"msg": format!("Field {idx} is invalid")})).collect();
    serde_json::to_vec(&json!({"message": "Validation failed", "errors": errors}))
        .unwrap_or_default()
}

fn classify_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_response");

    let page = job_list_body(50);
    group.bench_function("success_page_50", |b| {
        b.iter(|| {
            let outcome = classify_response(black_box(200), black_box(&page), 1, 3);
            assert!(matches!(outcome, AttemptOutcome::Success(_)));
        });
    });

    let invalid = validation_body();
    group.bench_function("validation_12_fields", |b| {
        b.iter(|| classify_response(black_box(422), black_box(&invalid), 1, 3));
    });

    group.bench_function("field_errors_only", |b| {
        b.iter(|| field_errors(black_box(&invalid)));
    });

    group.bench_function("server_error_html", |b| {
        let body: &[u8] = b"<html>Bad Gateway</html>";
        b.iter(|| classify_response(black_box(502), black_box(body), 2, 3));
    });

    group.finish();
}

criterion_group!(core_benchmarks, classify_benchmark);
criterion_main!(core_benchmarks);
