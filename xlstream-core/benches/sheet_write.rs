use criterion::{criterion_group, criterion_main, Criterion};
use xlstream_core::{CompressionLevel, Sheet, Style, Workbook};

fn bench_stream_100k_cells(c: &mut Criterion) {
    c.bench_function("stream_100k_cells", |b| {
        b.iter(|| {
            let mut wb = Workbook::new();
            wb.compression = CompressionLevel::None;
            wb.add_sheet(Sheet::new("Perf").with_writer(|sw| {
                for row in 1..=10_000u32 {
                    sw.start_row()?;
                    for col in 1..=10u32 {
                        sw.add_cell(row * col)?;
                    }
                }
                Ok(())
            }));
            wb.save_to_bytes().unwrap()
        })
    });
}

fn bench_stream_styled_cells(c: &mut Criterion) {
    c.bench_function("stream_10k_styled_cells", |b| {
        b.iter(|| {
            let mut wb = Workbook::new();
            wb.compression = CompressionLevel::None;
            wb.add_sheet(Sheet::new("Styled").with_writer(|sw| {
                let header = Style::new().with_bold(true);
                for row in 1..=1_000u32 {
                    sw.start_row()?;
                    for _ in 1..=10u32 {
                        sw.add_cell_styled(row, &header)?;
                    }
                }
                Ok(())
            }));
            wb.save_to_bytes().unwrap()
        })
    });
}

criterion_group!(benches, bench_stream_100k_cells, bench_stream_styled_cells);
criterion_main!(benches);
