//! Background streams on the Tokio blocking pool.

#![cfg(feature = "async-io")]

use flowpress_codec::tasks::{spawn_compress, spawn_decompress};
use flowpress_codec::{
    CompressionLevel, FlowError, Format, SessionState, StreamConfig, compress_stream_with,
};
use std::io::Cursor;

fn text(size: usize) -> Vec<u8> {
    b"async streams complete through a join handle\n"
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

#[tokio::test]
async fn test_task_matches_blocking_path() {
    let data = text(200_000);
    let config = StreamConfig::new().with_capacity(4096);

    let mut blocking = Vec::new();
    compress_stream_with(Cursor::new(&data), &mut blocking, Format::Zlib, &config).unwrap();

    let outcome = spawn_compress(Cursor::new(data.clone()), Vec::new(), Format::Zlib, &config)
        .unwrap()
        .join()
        .await
        .unwrap();
    let summary = outcome.result.unwrap();
    assert_eq!(summary.state, SessionState::Finished);
    assert_eq!(summary.bytes_in, data.len() as u64);
    assert_eq!(outcome.sink, blocking);

    let outcome = spawn_decompress(Cursor::new(outcome.sink), Vec::new(), Format::Zlib, &config)
        .unwrap()
        .join()
        .await
        .unwrap();
    outcome.result.unwrap();
    assert_eq!(outcome.sink, data);
}

#[tokio::test]
async fn test_task_reports_corruption() {
    let data = text(10_000);
    let config = StreamConfig::default();
    let mut compressed = Vec::new();
    compress_stream_with(Cursor::new(&data), &mut compressed, Format::Zlib, &config).unwrap();
    compressed.truncate(compressed.len() - 2);

    let outcome = spawn_decompress(Cursor::new(compressed), Vec::new(), Format::Zlib, &config)
        .unwrap()
        .join()
        .await
        .unwrap();
    assert!(outcome.result.unwrap_err().is_corrupt());
}

#[tokio::test]
async fn test_construction_error_is_immediate() {
    let config = StreamConfig::new().with_level(CompressionLevel::new(77));
    let err = spawn_compress(Cursor::new(Vec::new()), Vec::new(), Format::Zlib, &config)
        .err()
        .unwrap();
    assert!(matches!(err, FlowError::CapabilityInit { .. }));
}
