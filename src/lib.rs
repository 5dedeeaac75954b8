//! variant-aliases - HGVS alias generation for VEP-annotated variants
//!
//! Reads a tab-delimited VEP annotation table and builds, for every usable
//! row, a record of equivalent identifiers: rsID, SPDI, full HGVS, coding
//! HGVS and four protein-change spellings (three/one-letter, with and without
//! the `p.` prefix).
//!
//! # Features
//!
//! - Ordered HGVS protein notation parser (substitution, frameshift,
//!   deletion, insertion, duplication, extension)
//! - Fallback to the `Protein_position` / `Amino_acids` columns
//! - Zero-copy row parsing
//! - Streaming or buffered JSON output, optional parallel conversion with rayon
//! - Transparent gzip/bzip2 input
//!
//! # Example
//!
//! ```no_run
//! use variant_aliases::{convert_vep, ConvertOptions};
//!
//! let stats = convert_vep("variants.bed", "variants.json", &ConvertOptions::default())?;
//! println!("{} records written", stats.processed);
//! # Ok::<(), variant_aliases::ConverterError>(())
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    classify_protein_change, convert_1_to_3, convert_3_to_1, extract_rsid, parse_protein_change,
    parse_transcript_change, process_row, AaCode, ChangeKind, ConversionStats, ConverterError,
    HeaderError, ProteinChange, ProteinParse, RowError, RowOutcome, SkipReason, TranscriptChange,
    VariantFields, VariantRecord,
};
pub use formats::{convert_reader, convert_vep, read_records, ConvertOptions};
