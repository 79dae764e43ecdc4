//! Benchmarks for the streamed-response decoder

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures::StreamExt;
use synapse::providers::http::stream_from_chunks;
use synapse::providers::openai::OpenAIParser;
use synapse::providers::{OpenAIStream, SseDecoder};
use tokio::runtime::Runtime;

/// A realistic body: `fragments` content events, keep-alives, then the sentinel
fn event_body(fragments: usize) -> Vec<u8> {
    let mut body = String::new();
    for i in 0..fragments {
        if i % 50 == 0 {
            body.push_str(": keep-alive\n\n");
        }
        body.push_str(&format!(
            "data: {}\n\n",
            serde_json::json!({
                "id": "chatcmpl-bench",
                "object": "chat.completion.chunk",
                "choices": [{"index": 0, "delta": {"content": format!("token{} ", i)}}]
            })
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

fn benchmark_decoder_chunk_sizes(c: &mut Criterion) {
    let body = event_body(500);
    let mut group = c.benchmark_group("sse_decoder");

    for chunk_size in [16usize, 256, 4096] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut decoder = SseDecoder::new(OpenAIParser);
                    let mut count = 0;
                    for chunk in body.chunks(chunk_size) {
                        count += decoder.feed(black_box(chunk)).len();
                    }
                    decoder.finish();
                    count
                })
            },
        );
    }

    group.finish();
}

fn benchmark_fragment_stream(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let body = event_body(500);
    let chunks: Vec<Bytes> = body.chunks(512).map(Bytes::copy_from_slice).collect();

    c.bench_function("openai_stream_collect", |b| {
        b.to_async(&rt).iter(|| {
            let chunks = chunks.clone();
            async move {
                let stream = OpenAIStream::new(stream_from_chunks(chunks));
                let fragments: Vec<_> = stream.collect().await;
                black_box(fragments.len())
            }
        })
    });
}

criterion_group!(benches, benchmark_decoder_chunk_sizes, benchmark_fragment_stream);
criterion_main!(benches);
