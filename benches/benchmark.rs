//! Performance benchmarks for content-migrate.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - A synthetic page body covering every block type
//! - The same body scaled up to see how the passes grow with input size
//! - The full page driver, front matter and markdown included

use content_migrate::{convert_html, migrate_page, Options};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const SAMPLE_HTML: &str = r#"
<h1>Team news</h1>
<p>Welcome to the <b>team</b> page. Read the <a href="/about">about page</a> first.</p>
<p class="h 3">Upcoming events</p>
<ul>
    <li>Kick-off <em>Monday</em></li>
    <li><img src="/img/board.png" alt="Event board"></li>
    <li>Retrospective</li>
</ul>
<table>
    <tr><th>Day</th><th>Room</th></tr>
    <tr><td>Monday</td><td><img src="/img/room.png"></td></tr>
</table>
<iframe src="https://www.youtube.com/embed/xyz" title="Intro video"></iframe>
<details><summary>How do I join?</summary><p>Send us a message.</p></details>
<div class="cards">
    <a class="card" href="/a"><img src="/img/a.png" alt="A"><h3>Card A</h3><p>First card</p></a>
    <a class="card" href="/b"><img src="/img/b.png" alt="B"><h3>Card B</h3><p>Second card</p></a>
</div>
<blockquote class="twitter-tweet"><p>Hello</p><a href="https://twitter.com/x/status/1">link</a></blockquote>
<p><a href="/feedback">Share your feedback</a></p>
"#;

const SAMPLE_PAGE: &str = "---
layout: post
title: Team news
date: 2021-03-04
---
# Team news

Welcome to the **team** page.

| Day | Room |
|-----|------|
| Monday | 1.01 |

<iframe src=\"https://www.google.com/maps/embed?pb=1\" title=\"Office\"></iframe>
";

fn bench_convert_default(c: &mut Criterion) {
    let options = Options::default();
    c.bench_function("convert_default", |b| {
        b.iter(|| convert_html(black_box(SAMPLE_HTML), &options));
    });
}

fn bench_convert_scaled(c: &mut Criterion) {
    let options = Options::default();
    let mut group = c.benchmark_group("convert_scaled");
    for copies in [1usize, 10, 50] {
        let html = SAMPLE_HTML.repeat(copies);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(copies), &html, |b, html| {
            b.iter(|| convert_html(black_box(html), &options));
        });
    }
    group.finish();
}

fn bench_migrate_page(c: &mut Criterion) {
    let options = Options::default();
    c.bench_function("migrate_page", |b| {
        b.iter(|| migrate_page(black_box("_posts/2021-03-04-team-news.md"), black_box(SAMPLE_PAGE), &options));
    });
}

criterion_group!(benches, bench_convert_default, bench_convert_scaled, bench_migrate_page);
criterion_main!(benches);
