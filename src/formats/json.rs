//! JSON output for variant records
//!
//! Records are pretty-printed with 4-space indentation. Non-ASCII text is
//! written as-is, not escaped.

use crate::core::{Result, VariantRecord};
use serde::ser::Error as _;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::{Read, Write};

/// Indentation unit for pretty-printed output
pub const INDENT: &[u8] = b"    ";

/// Serialize a value with 4-space indentation
pub fn write_pretty<W: Write, T: Serialize + ?Sized>(
    writer: W,
    value: &T,
) -> serde_json::Result<()> {
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)
}

/// Serialize a value with 4-space indentation into a string
pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::with_capacity(256);
    write_pretty(&mut buf, value)?;
    String::from_utf8(buf).map_err(serde_json::Error::custom)
}

/// Write all records as a single JSON array
pub fn write_records<W: Write>(mut writer: W, records: &[VariantRecord]) -> Result<()> {
    write_pretty(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Read back a JSON array of records
pub fn read_records<R: Read>(reader: R) -> serde_json::Result<Vec<VariantRecord>> {
    serde_json::from_reader(reader)
}

/// Incremental writer for a JSON array of records
///
/// Writes `[` on creation, each record as soon as it is pushed (separated by
/// `,` and a newline), and `]` on [`JsonArrayWriter::finish`].
pub struct JsonArrayWriter<W: Write> {
    writer: W,
    count: usize,
}

impl<W: Write> JsonArrayWriter<W> {
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(b"[\n")?;
        Ok(Self { writer, count: 0 })
    }

    /// Append one record
    pub fn push(&mut self, record: &VariantRecord) -> Result<()> {
        if self.count > 0 {
            self.writer.write_all(b",\n")?;
        }
        write_pretty(&mut self.writer, record)?;
        self.count += 1;
        Ok(())
    }

    /// Number of records written so far
    pub fn count(&self) -> usize {
        self.count
    }

    /// Close the array and flush, returning the inner writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.write_all(b"\n]\n")?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, rsid: Option<&str>) -> VariantRecord {
        VariantRecord {
            internal_id: id.to_string(),
            rsid: rsid.map(str::to_string),
            spdi: "17:43106477:G:A".to_string(),
            hgvs_full: None,
            hgvsc: None,
            hgvsp_3p: "BRCA1 p.Ala1708Glu".to_string(),
            hgvsp_3: "BRCA1 Ala1708Glu".to_string(),
            hgvsp_1p: "BRCA1 p.A1708E".to_string(),
            hgvsp_1: "BRCA1 A1708E".to_string(),
        }
    }

    #[test]
    fn test_key_order_and_indent() {
        let json = to_pretty_string(&record("v1", Some("rs1"))).unwrap();
        let expected = concat!(
            "{\n",
            "    \"internal_id\": \"v1\",\n",
            "    \"rsid\": \"rs1\",\n",
            "    \"spdi\": \"17:43106477:G:A\",\n",
            "    \"hgvsp_3p\": \"BRCA1 p.Ala1708Glu\",\n",
            "    \"hgvsp_3\": \"BRCA1 Ala1708Glu\",\n",
            "    \"hgvsp_1p\": \"BRCA1 p.A1708E\",\n",
            "    \"hgvsp_1\": \"BRCA1 A1708E\"\n",
            "}"
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn test_absent_keys_omitted() {
        let json = to_pretty_string(&record("v1", None)).unwrap();
        assert!(!json.contains("rsid"));
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_non_ascii_preserved() {
        let mut rec = record("v1", None);
        rec.hgvsp_3 = "GÈNE Ala1708Glu".to_string();
        let json = to_pretty_string(&rec).unwrap();
        assert!(json.contains("GÈNE"));
    }

    #[test]
    fn test_streaming_layout() {
        let mut out = JsonArrayWriter::new(Vec::new()).unwrap();
        out.push(&record("v1", None)).unwrap();
        out.push(&record("v2", None)).unwrap();
        assert_eq!(out.count(), 2);
        let bytes = out.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("[\n{\n    \"internal_id\": \"v1\""));
        assert!(text.contains("},\n{\n    \"internal_id\": \"v2\""));
        assert!(text.ends_with("}\n]\n"));

        let records = read_records(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].internal_id, "v2");
    }

    #[test]
    fn test_streaming_empty() {
        let out = JsonArrayWriter::new(Vec::new()).unwrap();
        let text = String::from_utf8(out.finish().unwrap()).unwrap();
        assert_eq!(text, "[\n\n]\n");
        assert!(read_records(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_buffered_array() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[record("v1", None)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("[\n    {\n        \"internal_id\": \"v1\""));
        assert!(text.ends_with("    }\n]"));

        let mut empty = Vec::new();
        write_records(&mut empty, &[]).unwrap();
        assert_eq!(empty, b"[]");
    }
}
