//! # Flow Endpoint Benchmarks
//!
//! | Group | Operation |
//! |-------|-----------|
//! | channel | open a sealed request, seal the response |
//! | lookup | normalize a directory list with duplicates |
//! | token | normalize flow tokens |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flow_crypto::PrivateKeyMaterial;
use flow_endpoint::domain::{normalize_lookup, normalize_token, FlowConfig, RawLookupRecord};
use flow_endpoint::{ChannelCodec, FlowClient, FlowResponse, TagMode};
use serde_json::json;
use std::time::Duration;

fn bench_channel(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel");
    group.measurement_time(Duration::from_secs(10));

    let key = PrivateKeyMaterial::generate(2048).expect("key generation");
    let codec = ChannelCodec::new(key.clone());

    for (label, iv_len, mode) in [
        ("iv12_appended", 12, TagMode::Appended),
        ("iv16_detached", 16, TagMode::Detached),
    ] {
        let client = FlowClient::new(key.public_key())
            .with_iv_len(iv_len)
            .with_tag_mode(mode);
        let (envelope, _) = client
            .seal_request(&json!({
                "action": "data_exchange",
                "screen": "LOCATION_SELECT",
                "data": {"sel_c": "1", "selected_state": "12", "exchange_type": "STATE_CHANGE"},
            }))
            .expect("seal");
        let decoded = envelope.decode().expect("decode");

        group.bench_function(BenchmarkId::new("open_and_seal", label), |b| {
            b.iter(|| {
                let (_, context) = codec.open(black_box(&decoded)).expect("open");
                black_box(context.seal(&FlowResponse::liveness()).expect("seal"))
            })
        });
    }

    group.finish();
}

fn bench_lookup_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for size in [10usize, 100, 1000] {
        let records: Vec<RawLookupRecord> = (0..size)
            .map(|i| RawLookupRecord::new((i % (size / 2 + 1)).to_string(), format!("Region {i}")))
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("normalize", size), &records, |b, records| {
            b.iter(|| black_box(normalize_lookup(records.iter().cloned())))
        });
    }

    group.finish();
}

fn bench_token_normalization(c: &mut Criterion) {
    let flow = FlowConfig::default();
    let tokens = [
        Some("+919812345678"),
        Some("9812345678"),
        Some("flows-builder-preview"),
        Some("not-a-number"),
        None,
    ];

    c.bench_function("token/normalize", |b| {
        b.iter(|| {
            for token in tokens {
                black_box(normalize_token(black_box(token), &flow));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_channel,
    bench_lookup_normalization,
    bench_token_normalization
);
criterion_main!(benches);
