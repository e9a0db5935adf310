use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{extract, parse_timestamp, PoiFlags, RawAccidentRecord};

fn sample_record() -> RawAccidentRecord {
    RawAccidentRecord {
        start_time: parse_timestamp("2023-12-25 23:30:00").unwrap(),
        description: "Road blocked due to heavy accident. Queueing traffic.".to_string(),
        street: Some("I-95 N".to_string()),
        weather_condition: "Heavy Thunderstorms".to_string(),
        temperature_f: 30.0,
        humidity_percent: 90.0,
        pressure_in: 29.0,
        visibility_mi: 0.5,
        wind_speed_mph: 35.0,
        precipitation_in: Some(0.5),
        wind_direction: "NW".to_string(),
        poi: PoiFlags::default(),
    }
}

fn bench_extract(c: &mut Criterion) {
    let record = sample_record();
    c.bench_function("encode_and_assemble", |b| b.iter(|| extract(black_box(&record))));
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
