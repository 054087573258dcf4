//! パフォーマンスベンチマーク
//!
//! xlsxjsonクレートの各段階の処理速度を測定します。
//! フィクスチャはrust_xlsxwriterでメモリ上に生成します。
//!
//! 実装するベンチマーク:
//! - デコード + 正規化（10,000行 x 8列）
//! - 行範囲のJSON出力
//! - 複数ファイルのバッチエクスポート（ZIP作成を含む）

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use xlsxjson::{ExportSink, HeaderMode, Pipeline, PipelineBuilder, RowRange, SourceFile};

const COLUMNS: u16 = 8;

/// 先頭行にヘッダーを持つ表を生成
fn generate_table(rows: u32) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();

    for col in 0..COLUMNS {
        worksheet
            .write_string(0, col, format!("column_{}", col))
            .unwrap();
    }
    for row in 1..=rows {
        for col in 0..COLUMNS {
            if col % 2 == 0 {
                worksheet
                    .write_number(row, col, f64::from(row) * 1.5)
                    .unwrap();
            } else {
                worksheet
                    .write_string(row, col, format!("value {}-{}", row, col))
                    .unwrap();
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

fn first_row_pipeline() -> Pipeline {
    PipelineBuilder::new()
        .with_header_mode(HeaderMode::FirstRow)
        .build()
        .unwrap()
}

fn benchmark_load(c: &mut Criterion) {
    let data = generate_table(10_000);
    let pipeline = first_row_pipeline();

    let mut group = c.benchmark_group("load");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    group.bench_function("decode_and_normalize_10k_rows", |b| {
        b.iter(|| {
            let sheets = pipeline.load_bytes(black_box(&data)).unwrap();
            black_box(sheets)
        });
    });

    group.finish();
}

fn benchmark_export(c: &mut Criterion) {
    let pipeline = first_row_pipeline();
    let sheets = pipeline.load_bytes(&generate_table(10_000)).unwrap();
    let records = sheets[0].records();

    let mut group = c.benchmark_group("export");
    group.throughput(Throughput::Elements(records.len() as u64));

    group.bench_function("json_all_rows", |b| {
        b.iter(|| {
            let output = pipeline
                .export(
                    black_box(records),
                    RowRange::full(records.len()),
                    &ExportSink::Clipboard,
                )
                .unwrap();
            black_box(output)
        });
    });

    group.bench_function("json_window_100_rows", |b| {
        b.iter(|| {
            let output = pipeline
                .export(
                    black_box(records),
                    RowRange::new(5_000, 5_099),
                    &ExportSink::download(),
                )
                .unwrap();
            black_box(output)
        });
    });

    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let files: Vec<(String, Vec<u8>)> = (0..20)
        .map(|i| (format!("batch_{:02}.xlsx", i), generate_table(500)))
        .collect();
    let pipeline = first_row_pipeline();

    let mut group = c.benchmark_group("batch");
    group.throughput(Throughput::Elements(files.len() as u64));
    group.sample_size(10);

    group.bench_function("export_20_files", |b| {
        b.iter(|| {
            let sources = files
                .iter()
                .map(|(name, bytes)| SourceFile::from_bytes(name.clone(), bytes.clone()));
            let report = pipeline.export_batch(sources).unwrap();
            black_box(report)
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_load, benchmark_export, benchmark_batch);
criterion_main!(benches);
