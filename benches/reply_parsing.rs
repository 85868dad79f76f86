use criterion::{Criterion, black_box, criterion_group, criterion_main};

use wortkarten::model::{ProgressKey, ProgressMap};
use wortkarten::remote::reply::{parse_reply, strip_code_fences};

fn make_reply(count: usize) -> String {
    let cards: Vec<_> = (0..count)
        .map(|i| {
            serde_json::json!({
                "front": format!("das Wort {i}, die Wörter"),
                "back": format!("слово {i}"),
                "example": format!("Ich lerne das Wort {i} heute. — Я учу слово {i} сегодня."),
            })
        })
        .collect();
    let body = serde_json::json!({ "title": "Übungswörter", "cards": cards });
    format!("```json\n{body}\n```")
}

fn bench_parse(c: &mut Criterion) {
    let small = make_reply(15);
    let large = make_reply(200);

    c.bench_function("parse_reply (15 cards, fenced)", |b| {
        b.iter(|| parse_reply(black_box(&small)))
    });
    c.bench_function("parse_reply (200 cards, fenced)", |b| {
        b.iter(|| parse_reply(black_box(&large)))
    });
    c.bench_function("strip_code_fences (200 cards)", |b| {
        b.iter(|| strip_code_fences(black_box(&large)))
    });
}

fn bench_progress(c: &mut Criterion) {
    let ids: Vec<String> = (0..500).map(|i| format!("card{i}")).collect();
    let mut progress = ProgressMap::default();
    for id in ids.iter().step_by(3) {
        progress.set_known(&ProgressKey::new("essen", id), true);
    }

    c.bench_function("known_in (500 cards)", |b| {
        b.iter(|| progress.known_in(black_box("essen"), black_box(&ids)))
    });

    c.bench_function("progress json roundtrip (167 keys)", |b| {
        b.iter(|| {
            let json = serde_json::to_string(black_box(&progress)).unwrap();
            let back: ProgressMap = serde_json::from_str(&json).unwrap();
            black_box(back)
        })
    });
}

criterion_group!(benches, bench_parse, bench_progress);
criterion_main!(benches);
