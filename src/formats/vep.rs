//! VEP annotation table adapter
//!
//! Reads tab-delimited VEP output (the "BED" export with a named header row)
//! and converts each row into a [`VariantRecord`], writing the records as a
//! JSON array.
//!
//! Three modes are supported:
//! - buffered: all records are collected and written once at the end
//! - buffered parallel: rows are converted in chunks on a rayon pool, output
//!   order is preserved
//! - streaming: each record is written as soon as it is built

use crate::core::io::{create_output, is_same_file, open_input, ByteLineIterator};
use crate::core::{
    process_row, ConversionStats, ConverterError, HeaderError, Result, RowError, RowOutcome,
    RowResult, VariantFields, VariantRecord,
};
use crate::formats::json::{write_records, JsonArrayWriter};
use log::{debug, error, info, warn};
use memchr::memchr;
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;

/// Chunk size for parallel processing
const CHUNK_SIZE: usize = 10000;

/// Rows between progress messages
const PROGRESS_INTERVAL: usize = 1000;

/// Number of required columns
const COLUMN_COUNT: usize = 14;

/// Columns a VEP table must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Chrom,
    Pos,
    Id,
    Ref,
    Alt,
    Symbol,
    ExistingVariation,
    Gene,
    Feature,
    ProteinPosition,
    AminoAcids,
    ManeSelect,
    Hgvsc,
    Hgvsp,
}

impl Column {
    /// All required columns, in header order of a typical export
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Chrom,
        Column::Pos,
        Column::Id,
        Column::Ref,
        Column::Alt,
        Column::Symbol,
        Column::ExistingVariation,
        Column::Gene,
        Column::Feature,
        Column::ProteinPosition,
        Column::AminoAcids,
        Column::ManeSelect,
        Column::Hgvsc,
        Column::Hgvsp,
    ];

    /// Header name of the column
    pub fn name(self) -> &'static str {
        match self {
            Column::Chrom => "CHROM",
            Column::Pos => "POS",
            Column::Id => "ID",
            Column::Ref => "REF",
            Column::Alt => "ALT",
            Column::Symbol => "SYMBOL",
            Column::ExistingVariation => "Existing_variation",
            Column::Gene => "Gene",
            Column::Feature => "Feature",
            Column::ProteinPosition => "Protein_position",
            Column::AminoAcids => "Amino_acids",
            Column::ManeSelect => "MANE_SELECT",
            Column::Hgvsc => "HGVSc",
            Column::Hgvsp => "HGVSp",
        }
    }
}

/// Positions of the required columns within a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; COLUMN_COUNT],
}

impl ColumnMap {
    /// Build the map from a header line
    ///
    /// A single leading `#` on the first column name is ignored. When a name
    /// repeats, the last occurrence wins.
    pub fn from_header(header: &str) -> std::result::Result<Self, HeaderError> {
        let names: Vec<&str> = header.split('\t').collect();
        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            let name = if idx == 0 {
                name.strip_prefix('#').unwrap_or(name)
            } else {
                name
            };
            positions.insert(name, idx);
        }

        let mut indices = [0usize; COLUMN_COUNT];
        let mut missing = Vec::new();
        for (slot, column) in Column::ALL.iter().enumerate() {
            match positions.get(column.name()) {
                Some(&idx) => indices[slot] = idx,
                None => missing.push(column.name().to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(HeaderError::MissingColumns(missing));
        }

        info!("Found {} columns in header", positions.len());
        Ok(Self { indices })
    }

    /// Index of a column within a row
    pub fn index(&self, column: Column) -> usize {
        self.indices[column as usize]
    }

    /// Trimmed value of a column; empty when the row is too short
    pub fn value<'a>(&self, view: &VepRecordView<'a>, column: Column) -> RowResult<&'a str> {
        match view.field(self.index(column)) {
            Some(bytes) => std::str::from_utf8(bytes)
                .map(str::trim)
                .map_err(|_| RowError::InvalidUtf8 {
                    column: column.name(),
                }),
            None => Ok(""),
        }
    }

    /// Extract every field the record builder needs
    pub fn fields<'a>(&self, view: &VepRecordView<'a>) -> RowResult<VariantFields<'a>> {
        Ok(VariantFields {
            chrom: self.value(view, Column::Chrom)?,
            pos: self.value(view, Column::Pos)?,
            id: self.value(view, Column::Id)?,
            ref_allele: self.value(view, Column::Ref)?,
            alt: self.value(view, Column::Alt)?,
            symbol: self.value(view, Column::Symbol)?,
            existing_variation: self.value(view, Column::ExistingVariation)?,
            gene: self.value(view, Column::Gene)?,
            feature: self.value(view, Column::Feature)?,
            protein_position: self.value(view, Column::ProteinPosition)?,
            amino_acids: self.value(view, Column::AminoAcids)?,
            mane_select: self.value(view, Column::ManeSelect)?,
            hgvsc: self.value(view, Column::Hgvsc)?,
            hgvsp: self.value(view, Column::Hgvsp)?,
        })
    }
}

/// Zero-copy view of one tab-delimited row
///
/// Only field boundaries are located up front; fields are decoded on access.
pub struct VepRecordView<'a> {
    /// Original line bytes
    line: &'a [u8],
    /// Field boundaries (start, end)
    field_bounds: Vec<(usize, usize)>,
}

impl<'a> VepRecordView<'a> {
    /// Locate field boundaries using memchr for tab characters
    pub fn parse(line: &'a [u8]) -> Self {
        let mut field_bounds = Vec::with_capacity(COLUMN_COUNT + 8);
        let mut start = 0;

        while let Some(tab) = memchr(b'\t', &line[start..]) {
            field_bounds.push((start, start + tab));
            start += tab + 1;
        }
        field_bounds.push((start, line.len()));

        Self { line, field_bounds }
    }

    /// Get the number of fields
    pub fn field_count(&self) -> usize {
        self.field_bounds.len()
    }

    /// Raw bytes of a field
    pub fn field(&self, index: usize) -> Option<&'a [u8]> {
        self.field_bounds
            .get(index)
            .map(|&(start, end)| &self.line[start..end])
    }
}

/// Conversion settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Write records as they are produced instead of at the end
    pub stream: bool,
    /// Worker threads for buffered mode (1 = sequential)
    pub threads: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            stream: false,
            threads: 1,
        }
    }
}

/// Convert one data line
pub fn convert_line(columns: &ColumnMap, line: &[u8], row_num: usize) -> RowOutcome {
    let view = VepRecordView::parse(line);
    match columns.fields(&view) {
        Ok(fields) => process_row(&fields, row_num),
        Err(err) => RowOutcome::Failed(err),
    }
}

/// Count an outcome, log failures, and hand back the record if there is one
fn tally(
    stats: &mut ConversionStats,
    outcome: RowOutcome,
    row_num: usize,
) -> Option<VariantRecord> {
    stats.record(&outcome);
    match outcome {
        RowOutcome::Failed(err) => {
            error!("Row {}: Unexpected error: {}", row_num, err);
            debug!("Row {}: {:?}", row_num, err);
            None
        }
        other => other.into_record(),
    }
}

/// Read the header line and map the required columns
pub fn read_header<R: BufRead>(lines: &mut ByteLineIterator<R>) -> Result<ColumnMap> {
    let header = match lines.next_line() {
        Some(line) => line?,
        None => return Err(HeaderError::Missing.into()),
    };
    let header = std::str::from_utf8(header).map_err(|_| HeaderError::InvalidUtf8)?;
    Ok(ColumnMap::from_header(header)?)
}

/// Convert a VEP table file into a JSON file
///
/// The header is checked before the output file is created, so a table with
/// missing columns leaves no output behind.
///
/// # Arguments
/// * `input` - Input table (plain, gzip or bzip2)
/// * `output` - Output JSON path
/// * `options` - Streaming and threading settings
///
/// # Returns
/// Conversion statistics
pub fn convert_vep<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ConvertOptions,
) -> Result<ConversionStats> {
    let input = input.as_ref();
    let output = output.as_ref();
    info!(
        "Starting {}conversion of {}",
        if options.stream { "streaming " } else { "" },
        input.display()
    );

    if is_same_file(input, output) {
        return Err(ConverterError::OutputIsInput(output.to_path_buf()));
    }

    let reader = open_input(input).map_err(|e| ConverterError::from_io(e, input))?;
    let mut lines = ByteLineIterator::new(reader);
    let columns = read_header(&mut lines)?;

    let writer = create_output(output).map_err(|e| ConverterError::from_output_io(e, output))?;
    convert_rows(&mut lines, &columns, writer, options)
}

/// Convert a VEP table from any reader into any writer
pub fn convert_reader<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    options: &ConvertOptions,
) -> Result<ConversionStats> {
    let mut lines = ByteLineIterator::new(reader);
    let columns = read_header(&mut lines)?;
    convert_rows(&mut lines, &columns, writer, options)
}

fn convert_rows<R: BufRead, W: Write>(
    lines: &mut ByteLineIterator<R>,
    columns: &ColumnMap,
    writer: W,
    options: &ConvertOptions,
) -> Result<ConversionStats> {
    if options.stream {
        if options.threads > 1 {
            warn!("Streaming mode is sequential; ignoring {} threads", options.threads);
        }
        convert_streaming(lines, columns, writer)
    } else if options.threads > 1 {
        convert_parallel(lines, columns, writer, options.threads)
    } else {
        convert_sequential(lines, columns, writer)
    }
}

/// Streaming conversion: each record is written as soon as it is built
fn convert_streaming<R: BufRead, W: Write>(
    lines: &mut ByteLineIterator<R>,
    columns: &ColumnMap,
    writer: W,
) -> Result<ConversionStats> {
    let mut out = JsonArrayWriter::new(writer)?;
    let mut stats = ConversionStats::default();
    let mut row_num = 1; // header

    while let Some(line) = lines.next_line() {
        let line = line?;
        row_num += 1;
        if line.is_empty() {
            continue;
        }
        if row_num % PROGRESS_INTERVAL == 0 {
            info!("Processed {} rows...", row_num);
        }

        let outcome = convert_line(columns, line, row_num);
        if let Some(record) = tally(&mut stats, outcome, row_num) {
            out.push(&record)?;
        }
    }

    info!("Wrote {} variants", out.count());
    out.finish()?;
    Ok(stats)
}

/// Sequential buffered conversion
fn convert_sequential<R: BufRead, W: Write>(
    lines: &mut ByteLineIterator<R>,
    columns: &ColumnMap,
    writer: W,
) -> Result<ConversionStats> {
    let mut records = Vec::new();
    let mut stats = ConversionStats::default();
    let mut row_num = 1; // header

    while let Some(line) = lines.next_line() {
        let line = line?;
        row_num += 1;
        if line.is_empty() {
            continue;
        }
        if row_num % PROGRESS_INTERVAL == 0 {
            info!("Processed {} rows...", row_num);
        }

        let outcome = convert_line(columns, line, row_num);
        if let Some(record) = tally(&mut stats, outcome, row_num) {
            records.push(record);
        }
    }

    info!("Writing {} variants", records.len());
    write_records(writer, &records)?;
    Ok(stats)
}

/// Parallel buffered conversion using rayon
///
/// Each chunk keeps its own statistics; chunks are merged in input order so
/// the output matches the sequential run.
fn convert_parallel<R: BufRead, W: Write>(
    lines: &mut ByteLineIterator<R>,
    columns: &ColumnMap,
    writer: W,
    threads: usize,
) -> Result<ConversionStats> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ConverterError::ThreadPool(e.to_string()))?;

    // Read all data lines with their row numbers
    let mut data_lines: Vec<(usize, Vec<u8>)> = Vec::new();
    let mut row_num = 1; // header
    while let Some(line) = lines.next_line() {
        let line = line?;
        row_num += 1;
        if !line.is_empty() {
            data_lines.push((row_num, line.to_vec()));
        }
    }
    info!("Read {} rows, converting on {} threads", data_lines.len(), threads);

    let results: Vec<(Vec<VariantRecord>, ConversionStats)> = pool.install(|| {
        data_lines
            .par_chunks(CHUNK_SIZE)
            .map(|chunk| {
                let mut records = Vec::with_capacity(chunk.len());
                let mut stats = ConversionStats::default();
                for (row_num, line) in chunk {
                    let outcome = convert_line(columns, line, *row_num);
                    if let Some(record) = tally(&mut stats, outcome, *row_num) {
                        records.push(record);
                    }
                }
                (records, stats)
            })
            .collect()
    });

    let mut stats = ConversionStats::default();
    let mut records = Vec::with_capacity(data_lines.len());
    for (chunk_records, chunk_stats) in results {
        stats.merge(&chunk_stats);
        records.extend(chunk_records);
    }

    info!("Writing {} variants", records.len());
    write_records(writer, &records)?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SkipReason;

    const HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tSYMBOL\tExisting_variation\tGene\tFeature\tProtein_position\tAmino_acids\tMANE_SELECT\tHGVSc\tHGVSp";

    const BRCA1_ROW: &str = "chr17\t43106478\trs80357382\tG\tA\tBRCA1\trs80357382\tENSG00000012048\tENST00000357654\t1708\tA/E\tNM_007294.4\tENST00000357654.9:c.5123C>A\tENSP00000350283.3:p.Ala1708Glu";

    fn columns() -> ColumnMap {
        ColumnMap::from_header(HEADER).unwrap()
    }

    #[test]
    fn test_header_strips_hash() {
        let map = columns();
        assert_eq!(map.index(Column::Chrom), 0);
        assert_eq!(map.index(Column::Hgvsp), 13);
    }

    #[test]
    fn test_header_reordered_and_extra_columns() {
        let header = "QUAL\tHGVSp\tHGVSc\tMANE_SELECT\tAmino_acids\tProtein_position\tFeature\tGene\tExisting_variation\tSYMBOL\tALT\tREF\tID\tPOS\tCHROM";
        let map = ColumnMap::from_header(header).unwrap();
        assert_eq!(map.index(Column::Chrom), 14);
        assert_eq!(map.index(Column::Hgvsp), 1);
    }

    #[test]
    fn test_header_missing_columns() {
        let header = "#CHROM\tPOS\tID\tREF\tALT\tSYMBOL";
        let err = ColumnMap::from_header(header).unwrap_err();
        match err {
            HeaderError::MissingColumns(missing) => {
                assert_eq!(missing.len(), 8);
                assert_eq!(missing[0], "Existing_variation");
                assert!(missing.contains(&"HGVSp".to_string()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_record_view_fields() {
        let view = VepRecordView::parse(b"a\t\tc");
        assert_eq!(view.field_count(), 3);
        assert_eq!(view.field(0), Some(&b"a"[..]));
        assert_eq!(view.field(1), Some(&b""[..]));
        assert_eq!(view.field(2), Some(&b"c"[..]));
        assert_eq!(view.field(3), None);
    }

    #[test]
    fn test_short_row_gives_empty_values() {
        let map = columns();
        let view = VepRecordView::parse(b"chr1\t100");
        let fields = map.fields(&view).unwrap();
        assert_eq!(fields.chrom, "chr1");
        assert_eq!(fields.pos, "100");
        assert_eq!(fields.hgvsp, "");
    }

    #[test]
    fn test_values_are_trimmed() {
        let map = columns();
        let view = VepRecordView::parse(b" chr1 \t 100 ");
        assert_eq!(map.value(&view, Column::Chrom).unwrap(), "chr1");
        assert_eq!(map.value(&view, Column::Pos).unwrap(), "100");
    }

    #[test]
    fn test_convert_line_invalid_utf8() {
        let map = columns();
        let outcome = convert_line(&map, b"chr1\t100\tid\tA\tT\t\xff\xfe", 2);
        assert_eq!(
            outcome,
            RowOutcome::Failed(RowError::InvalidUtf8 { column: "SYMBOL" })
        );
    }

    #[test]
    fn test_convert_line_brca1() {
        let record = convert_line(&columns(), BRCA1_ROW.as_bytes(), 2)
            .into_record()
            .unwrap();
        assert_eq!(record.spdi, "17:43106477:G:A");
        assert_eq!(record.hgvsp_1p, "BRCA1 p.A1708E");
    }

    #[test]
    fn test_convert_reader_buffered() {
        let input = format!("{}\n{}\n\n", HEADER, BRCA1_ROW);
        let mut out = Vec::new();
        let stats = convert_reader(input.as_bytes(), &mut out, &ConvertOptions::default()).unwrap();

        assert_eq!(stats.total_rows, 1);
        assert_eq!(stats.processed, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[\n    {"));
        assert!(text.contains("\"hgvsp_3p\": \"BRCA1 p.Ala1708Glu\""));
    }

    #[test]
    fn test_convert_reader_streaming() {
        let sniffles = BRCA1_ROW.replacen("rs80357382", "Sniffles2.INS.1", 1);
        let input = format!("{}\n{}\n{}\n", HEADER, BRCA1_ROW, sniffles);
        let mut out = Vec::new();
        let options = ConvertOptions { stream: true, threads: 1 };
        let stats = convert_reader(input.as_bytes(), &mut out, &options).unwrap();

        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.filtered, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[\n{\n"));
        assert!(text.ends_with("}\n]\n"));
    }

    #[test]
    fn test_convert_reader_missing_header() {
        let mut out = Vec::new();
        let err = convert_reader(&b""[..], &mut out, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConverterError::Header(HeaderError::Missing)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_convert_reader_parallel_matches_sequential() {
        let mut input = String::from(HEADER);
        for i in 0..50 {
            input.push('\n');
            if i % 7 == 0 {
                input.push_str(&BRCA1_ROW.replace("chr17", "scaffold"));
            } else {
                input.push_str(&BRCA1_ROW.replace("43106478", &(43106478 + i).to_string()));
            }
        }

        let mut sequential = Vec::new();
        let seq_stats =
            convert_reader(input.as_bytes(), &mut sequential, &ConvertOptions::default()).unwrap();
        let mut parallel = Vec::new();
        let options = ConvertOptions { stream: false, threads: 4 };
        let par_stats = convert_reader(input.as_bytes(), &mut parallel, &options).unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(seq_stats, par_stats);
        assert_eq!(seq_stats.invalid_chromosome, 8);
    }

    #[test]
    fn test_skip_reason_counted() {
        let mut stats = ConversionStats::default();
        let outcome = RowOutcome::Skipped(SkipReason::Synonymous);
        assert!(tally(&mut stats, outcome, 2).is_none());
        assert_eq!(stats.synonymous, 1);
    }
}
