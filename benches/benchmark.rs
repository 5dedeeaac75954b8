//! Performance benchmarks for variant-aliases
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use variant_aliases::core::amino::convert_3_to_1;
use variant_aliases::core::notation::{extract_rsid, parse_protein_change};
use variant_aliases::formats::vep::{convert_line, convert_reader, ColumnMap, VepRecordView};
use variant_aliases::formats::ConvertOptions;

const HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tSYMBOL\tExisting_variation\tGene\tFeature\tProtein_position\tAmino_acids\tMANE_SELECT\tHGVSc\tHGVSp";

const ROW: &str = "chr17\t43106478\t17_43106478_G_A\tG\tA\tBRCA1\trs80357382\tENSG00000012048\tENST00000357654\t1708\tA/E\tNM_007294.4\tENST00000357654.9:c.5123C>A\tENSP00000350283.3:p.Ala1708Glu";

/// Benchmark HGVSp parsing for each rule in priority order
fn bench_protein_parsing(c: &mut Criterion) {
    let notations = [
        ("substitution", "ENSP00000350283.3:p.Ala1708Glu"),
        ("frameshift", "ENSP00000350283.3:p.Glu386GlyfsTer6"),
        ("deletion", "ENSP00000350283.3:p.Asp999_Ser1001del"),
        ("insertion", "ENSP00000350283.3:p.Pro270_Ala271insLysLeu"),
        ("duplication", "ENSP00000350283.3:p.Gln34_Gln38dup"),
        ("extension", "ENSP00000350283.3:p.*110Leuext*17"),
    ];

    let mut group = c.benchmark_group("protein_parsing");

    for (name, notation) in notations.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), notation, |b, notation| {
            b.iter(|| {
                let result = parse_protein_change(black_box(notation));
                black_box(result)
            })
        });
    }

    group.finish();
}

/// Benchmark amino-acid code conversion
fn bench_amino_conversion(c: &mut Criterion) {
    let codes = ["Ala", "Ter", "Glyfs", "del", "Sec"];

    c.bench_function("convert_3_to_1", |b| {
        b.iter(|| {
            for code in &codes {
                black_box(convert_3_to_1(black_box(code)));
            }
        })
    });
}

/// Benchmark rsID extraction
fn bench_rsid(c: &mut Criterion) {
    let field = "COSV58787012,CM920008,rs80357382";

    c.bench_function("extract_rsid", |b| {
        b.iter(|| black_box(extract_rsid(black_box(field))))
    });
}

/// Benchmark row splitting and full row conversion
fn bench_row(c: &mut Criterion) {
    let columns = ColumnMap::from_header(HEADER).unwrap();

    c.bench_function("row_split", |b| {
        b.iter(|| black_box(VepRecordView::parse(black_box(ROW.as_bytes()))))
    });

    c.bench_function("row_convert", |b| {
        b.iter(|| black_box(convert_line(&columns, black_box(ROW.as_bytes()), 2)))
    });
}

/// Benchmark whole-table conversion, sequential and parallel
fn bench_table(c: &mut Criterion) {
    let mut table = String::from(HEADER);
    for _ in 0..20_000 {
        table.push('\n');
        table.push_str(ROW);
    }

    let mut group = c.benchmark_group("table_conversion");
    group.throughput(Throughput::Elements(20_000));
    group.sample_size(10);

    for threads in [1usize, 4].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |b, &threads| {
            let options = ConvertOptions { stream: false, threads };
            b.iter(|| {
                let mut out = Vec::with_capacity(table.len() * 2);
                let stats = convert_reader(table.as_bytes(), &mut out, &options).unwrap();
                black_box((stats, out))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_protein_parsing,
    bench_amino_conversion,
    bench_rsid,
    bench_row,
    bench_table,
);

criterion_main!(benches);
