//! Per-row processing and conversion statistics
//!
//! A row goes through a fixed sequence of checks, each of which can end it:
//! chromosome, position, ID filter, protein change resolution, then record
//! assembly. [`process_row`] holds no state; counting happens in
//! [`ConversionStats::record`] on the returned outcome.

use crate::core::error::RowError;
use crate::core::record::{
    build_record, resolve_protein, split_alt_alleles, ProteinResolution, VariantFields,
    VariantRecord,
};
use crate::core::validate::{is_valid_chromosome, parse_position};
use log::{debug, info, warn};

/// IDs with this prefix come from a structural-variant caller and are skipped
pub const SKIPPED_ID_PREFIX: &str = "Sniffles2";

/// Why a row produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    InvalidChromosome,
    InvalidPosition,
    /// ID matched the skip prefix
    Filtered,
    /// HGVSp marks a synonymous change
    Synonymous,
    /// No protein change from HGVSp or the amino-acid columns
    MissingProteinChange,
}

/// What became of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Emitted(VariantRecord),
    Skipped(SkipReason),
    Failed(RowError),
}

impl RowOutcome {
    pub fn into_record(self) -> Option<VariantRecord> {
        match self {
            RowOutcome::Emitted(record) => Some(record),
            _ => None,
        }
    }
}

/// Conversion statistics
///
/// Every data row lands in exactly one of `processed`, `invalid_chromosome`,
/// `invalid_position`, `filtered`, `synonymous`, `missing_hgvsp` or `errors`.
/// `skipped` sums all rows without a record; `missing_rsid` counts emitted
/// records that carry no rsID.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    pub total_rows: usize,
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub missing_rsid: usize,
    pub missing_hgvsp: usize,
    pub invalid_chromosome: usize,
    pub invalid_position: usize,
    pub filtered: usize,
    pub synonymous: usize,
}

impl ConversionStats {
    /// Count one row's outcome
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.total_rows += 1;
        match outcome {
            RowOutcome::Emitted(record) => {
                self.processed += 1;
                if record.rsid.is_none() {
                    self.missing_rsid += 1;
                }
            }
            RowOutcome::Skipped(reason) => {
                self.skipped += 1;
                match reason {
                    SkipReason::InvalidChromosome => self.invalid_chromosome += 1,
                    SkipReason::InvalidPosition => self.invalid_position += 1,
                    SkipReason::Filtered => self.filtered += 1,
                    SkipReason::Synonymous => self.synonymous += 1,
                    SkipReason::MissingProteinChange => self.missing_hgvsp += 1,
                }
            }
            RowOutcome::Failed(_) => {
                self.skipped += 1;
                self.errors += 1;
            }
        }
    }

    /// Fold in the counters of another chunk of rows
    pub fn merge(&mut self, other: &ConversionStats) {
        self.total_rows += other.total_rows;
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.missing_rsid += other.missing_rsid;
        self.missing_hgvsp += other.missing_hgvsp;
        self.invalid_chromosome += other.invalid_chromosome;
        self.invalid_position += other.invalid_position;
        self.filtered += other.filtered;
        self.synonymous += other.synonymous;
    }

    /// Percentage of rows that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.processed as f64 / self.total_rows as f64 * 100.0
        }
    }

    /// Log the counters at info level
    pub fn report(&self) {
        info!("=== Conversion Statistics ===");
        info!("Total rows read:     {}", self.total_rows);
        info!("Variants processed:  {}", self.processed);
        info!("Rows skipped:        {}", self.skipped);
        info!("Errors encountered:  {}", self.errors);
        info!("Records missing rsID: {}", self.missing_rsid);
        info!("Rows missing HGVSp:  {}", self.missing_hgvsp);
        info!("Invalid chromosomes: {}", self.invalid_chromosome);
        info!("Invalid positions:   {}", self.invalid_position);
        info!("Filtered by ID:      {}", self.filtered);
        info!("Synonymous:          {}", self.synonymous);
        info!("Success rate: {:.1}%", self.success_rate());
    }
}

/// Turn one row into a record, or say why not
///
/// `row_num` is only used in log messages.
pub fn process_row(fields: &VariantFields, row_num: usize) -> RowOutcome {
    if !is_valid_chromosome(fields.chrom) {
        warn!("Row {}: Invalid chromosome: {}", row_num, fields.chrom);
        return RowOutcome::Skipped(SkipReason::InvalidChromosome);
    }

    let position = match parse_position(fields.pos) {
        Some(position) => position,
        None => {
            warn!("Row {}: Invalid position: {}", row_num, fields.pos);
            return RowOutcome::Skipped(SkipReason::InvalidPosition);
        }
    };

    if fields.id.starts_with(SKIPPED_ID_PREFIX) {
        debug!("Row {}: Skipping {} variant", row_num, SKIPPED_ID_PREFIX);
        return RowOutcome::Skipped(SkipReason::Filtered);
    }

    let alleles = split_alt_alleles(fields.alt);
    let alt_allele = match alleles.first() {
        Some(allele) => *allele,
        None => {
            return RowOutcome::Failed(RowError::NoAltAllele {
                alt: fields.alt.to_string(),
            })
        }
    };
    if alleles.len() > 1 {
        info!(
            "Row {}: Multi-allelic variant with {} alternate alleles, keeping {}",
            row_num,
            alleles.len(),
            alt_allele
        );
    }

    match resolve_protein(fields) {
        ProteinResolution::Resolved(protein) => {
            RowOutcome::Emitted(build_record(fields, position, alt_allele, &protein))
        }
        ProteinResolution::Synonymous => RowOutcome::Skipped(SkipReason::Synonymous),
        ProteinResolution::Unresolved => {
            warn!("Row {}: No usable protein change (HGVSp: '{}')", row_num, fields.hgvsp);
            RowOutcome::Skipped(SkipReason::MissingProteinChange)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> VariantFields<'static> {
        VariantFields {
            chrom: "chr7",
            pos: "140753336",
            id: "var_1",
            ref_allele: "A",
            alt: "T",
            symbol: "BRAF",
            existing_variation: "rs113488022,COSV56056643",
            gene: "ENSG00000157764",
            feature: "ENST00000646891",
            protein_position: "600",
            amino_acids: "V/E",
            mane_select: "NM_004333.6",
            hgvsc: "ENST00000646891.2:c.1799T>A",
            hgvsp: "ENSP00000493543.1:p.Val600Glu",
        }
    }

    #[test]
    fn test_emitted() {
        let outcome = process_row(&row(), 2);
        let record = outcome.into_record().unwrap();
        assert_eq!(record.spdi, "7:140753335:A:T");
        assert_eq!(record.rsid.as_deref(), Some("rs113488022"));
        assert_eq!(record.hgvsp_1, "BRAF V600E");
    }

    #[test]
    fn test_invalid_chromosome() {
        let fields = VariantFields { chrom: "scaffold_9", ..row() };
        assert_eq!(process_row(&fields, 2), RowOutcome::Skipped(SkipReason::InvalidChromosome));
    }

    #[test]
    fn test_invalid_position() {
        let fields = VariantFields { pos: "0", ..row() };
        assert_eq!(process_row(&fields, 2), RowOutcome::Skipped(SkipReason::InvalidPosition));
    }

    #[test]
    fn test_chromosome_checked_before_position() {
        let fields = VariantFields { chrom: "", pos: "x", ..row() };
        assert_eq!(process_row(&fields, 2), RowOutcome::Skipped(SkipReason::InvalidChromosome));
    }

    #[test]
    fn test_sniffles_filtered() {
        let fields = VariantFields { id: "Sniffles2.INS.1S0", ..row() };
        assert_eq!(process_row(&fields, 2), RowOutcome::Skipped(SkipReason::Filtered));
    }

    #[test]
    fn test_synonymous() {
        let fields = VariantFields { hgvsp: "ENSP1:p.Val600=", ..row() };
        assert_eq!(process_row(&fields, 2), RowOutcome::Skipped(SkipReason::Synonymous));
    }

    #[test]
    fn test_missing_protein_change() {
        let fields = VariantFields { hgvsp: "-", amino_acids: "-", ..row() };
        assert_eq!(
            process_row(&fields, 2),
            RowOutcome::Skipped(SkipReason::MissingProteinChange)
        );
    }

    #[test]
    fn test_empty_alt_is_error() {
        let fields = VariantFields { alt: ",", ..row() };
        assert!(matches!(
            process_row(&fields, 2),
            RowOutcome::Failed(RowError::NoAltAllele { .. })
        ));
    }

    #[test]
    fn test_multi_allelic_keeps_first() {
        let fields = VariantFields { alt: "T,G", ..row() };
        let record = process_row(&fields, 2).into_record().unwrap();
        assert_eq!(record.spdi, "7:140753335:A:T");
        assert!(!record.aliases().iter().any(|(_, v)| v.contains(":G")));
    }

    #[test]
    fn test_stats_one_counter_per_row() {
        let mut stats = ConversionStats::default();
        stats.record(&process_row(&row(), 2));
        stats.record(&process_row(&VariantFields { chrom: "", ..row() }, 3));
        stats.record(&process_row(&VariantFields { pos: "-1", ..row() }, 4));
        stats.record(&process_row(&VariantFields { id: "Sniffles2.DEL", ..row() }, 5));
        stats.record(&process_row(&VariantFields { hgvsp: "ENSP1:p.Val600%3D", ..row() }, 6));
        stats.record(&process_row(&VariantFields { hgvsp: "-", amino_acids: "", ..row() }, 7));
        stats.record(&process_row(&VariantFields { alt: ",", ..row() }, 8));
        stats.record(&process_row(&VariantFields { existing_variation: "-", ..row() }, 9));

        assert_eq!(stats.total_rows, 8);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.skipped, 6);
        assert_eq!(stats.invalid_chromosome, 1);
        assert_eq!(stats.invalid_position, 1);
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.synonymous, 1);
        assert_eq!(stats.missing_hgvsp, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.missing_rsid, 1);
    }

    #[test]
    fn test_stats_merge() {
        let mut a = ConversionStats {
            total_rows: 3,
            processed: 2,
            skipped: 1,
            errors: 1,
            ..Default::default()
        };
        let b = ConversionStats {
            total_rows: 2,
            processed: 1,
            skipped: 1,
            filtered: 1,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.total_rows, 5);
        assert_eq!(a.processed, 3);
        assert_eq!(a.skipped, 2);
        assert_eq!(a.errors, 1);
        assert_eq!(a.filtered, 1);
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(ConversionStats::default().success_rate(), 0.0);
        let stats = ConversionStats { total_rows: 4, processed: 1, ..Default::default() };
        assert!((stats.success_rate() - 25.0).abs() < f64::EPSILON);
    }
}
