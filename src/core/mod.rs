//! Core variant notation functionality
//!
//! This module contains the amino-acid table, the HGVS notation parser,
//! row validation, and alias record construction.

pub mod amino;
mod error;
pub mod io;
pub mod notation;
pub mod pipeline;
pub mod record;
pub mod validate;

pub use amino::{convert_1_to_3, convert_3_to_1, one_to_three, three_to_one, AaCode};
pub use error::{ConverterError, HeaderError, Result, RowError, RowResult};
pub use io::{
    detect_compression, is_same_file, open_input, ByteLineIterator, CompressionFormat,
    DEFAULT_BUFFER_SIZE,
};
pub use notation::{
    classify_protein_change, extract_rsid, parse_protein_change, parse_transcript_change,
    ChangeKind, ProteinChange, ProteinParse, TranscriptChange,
};
pub use pipeline::{process_row, ConversionStats, RowOutcome, SkipReason};
pub use record::{VariantFields, VariantRecord};
pub use validate::{is_valid_chromosome, is_valid_position};
