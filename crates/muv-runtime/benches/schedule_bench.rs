//! Scheduler and render-pass throughput.

use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use muv_core::Value;
use muv_runtime::{App, BoundView, LabClock, RateLimiter, TimeSource, ViewConfig};

fn bench_schedule_drain(c: &mut Criterion) {
    c.bench_function("schedule_1k_zero_interval", |b| {
        b.iter(|| {
            let limiter = RateLimiter::new(TimeSource::Lab(LabClock::new()));
            for n in 0..1_000u64 {
                limiter.schedule("k", Duration::ZERO, Box::new(move || {
                    black_box(n);
                }));
            }
        });
    });

    c.bench_function("schedule_throttled_burst", |b| {
        b.iter(|| {
            let clock = LabClock::new();
            let limiter = RateLimiter::new(TimeSource::Lab(clock.clone()));
            for n in 0..100u64 {
                limiter.schedule(
                    "k",
                    Duration::from_millis(50),
                    Box::new(move || {
                        black_box(n);
                    }),
                );
            }
            while let Some(deadline) = limiter.next_deadline() {
                let now = clock.now();
                if deadline > now {
                    clock.advance(deadline.duration_since(now));
                }
                limiter.tick();
            }
        });
    });
}

fn bench_render_pass(c: &mut Criterion) {
    let app = App::with_clock(LabClock::new());
    let doc = app.document();
    doc.set_inner_html(doc.root(), "<div id=\"stage\"></div>");
    let el = doc.query_selector("#stage");

    let mut template = String::new();
    let mut model = Vec::new();
    for n in 0..50 {
        template.push_str(&format!("<span data-model=\"field{n}\"></span>"));
        model.push((format!("field{n}"), Value::Int(n)));
    }
    let view = match BoundView::new(
        &app,
        ViewConfig {
            el,
            template,
            model,
            ..ViewConfig::default()
        },
    ) {
        Ok(view) => view,
        Err(err) => panic!("bench view setup failed: {err}"),
    };

    c.bench_function("render_pass_50_bound_nodes", |b| {
        b.iter(|| view.render());
    });
}

criterion_group!(benches, bench_schedule_drain, bench_render_pass);
criterion_main!(benches);
