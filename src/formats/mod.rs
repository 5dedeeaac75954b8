//! File format adapters
//!
//! Adapters for the VEP annotation table input and the JSON record output.

pub mod json;
pub mod vep;

pub use json::{read_records, to_pretty_string, write_records, JsonArrayWriter};
pub use vep::{convert_reader, convert_vep, Column, ColumnMap, ConvertOptions, VepRecordView};
