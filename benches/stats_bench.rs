use chaoscatcher::ops::{self, DateFilter, Window};
use chaoscatcher::records::{DataDocument, MedicationEntry, MoodEntry};
use chrono::{Duration, Local, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const DAYS: i64 = 1000;
const ENTRIES_PER_DAY: i64 = 3;

fn build_document() -> DataDocument {
    let start = Local.with_ymd_and_hms(2023, 6, 1, 8, 0, 0).unwrap();
    let mut doc = DataDocument::new();

    for day in 0..DAYS {
        for slot in 0..ENTRIES_PER_DAY {
            let ts = (start + Duration::days(day) + Duration::hours(slot * 5)).fixed_offset();
            let score = 1 + (day * 7 + slot * 3) % 10;
            let tags = vec![format!("tag{}", day % 12), "baseline".to_string()];
            doc.append_mood(
                MoodEntry::new(ts, score)
                    .unwrap()
                    .with_tags(tags)
                    .with_sleep(Some(360 + (day % 120) as u32), None, None),
            )
            .unwrap();
        }
        let ts = (start + Duration::days(day)).fixed_offset();
        doc.append_medication(MedicationEntry::new(ts, "Vyvanse", "30 mg").unwrap())
            .unwrap();
    }

    doc
}

fn bench_stats(c: &mut Criterion) {
    let doc = build_document();
    let now = Local.with_ymd_and_hms(2026, 2, 25, 12, 0, 0).unwrap();

    c.bench_function("mood_stats_30_days", |b| {
        b.iter(|| ops::mood_stats(black_box(doc.moods()), Window::Days(30), now, 0.05))
    });

    c.bench_function("mood_stats_all_time", |b| {
        b.iter(|| ops::mood_stats(black_box(doc.moods()), Window::AllTime, now, 0.05))
    });

    c.bench_function("medication_stats_90_days", |b| {
        b.iter(|| ops::medication_stats(black_box(doc.medications()), 90, now))
    });

    c.bench_function("list_all_moods", |b| {
        b.iter(|| ops::list(black_box(doc.moods()), &DateFilter::all()).len())
    });

    c.bench_function("summary", |b| b.iter(|| ops::summary(black_box(&doc), now)));
}

criterion_group!(benches, bench_stats);
criterion_main!(benches);
