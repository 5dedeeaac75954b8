//! Variant alias records
//!
//! Builds the SPDI string, the full HGVS string and the protein aliases for a
//! single annotated variant.

use crate::core::amino::{convert_3_to_1, lookup_one, lookup_three};
use crate::core::notation::{
    classify_protein_change, extract_rsid, is_missing, parse_transcript_change, strip_reference,
    ProteinParse,
};
use crate::core::validate::parse_position;
use log::debug;
use serde::{Deserialize, Serialize};

/// Prefix of a MANE transcript usable in `hgvs_full`
const REFSEQ_MRNA_PREFIX: &str = "NM_";

/// Fields a record is built from, borrowed from one input row
///
/// Values are trimmed; absent columns are empty strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantFields<'a> {
    pub chrom: &'a str,
    pub pos: &'a str,
    pub id: &'a str,
    pub ref_allele: &'a str,
    pub alt: &'a str,
    pub symbol: &'a str,
    pub existing_variation: &'a str,
    pub gene: &'a str,
    pub feature: &'a str,
    pub protein_position: &'a str,
    pub amino_acids: &'a str,
    pub mane_select: &'a str,
    pub hgvsc: &'a str,
    pub hgvsp: &'a str,
}

/// The alias set emitted for one variant
///
/// Field order is the serialization order. Optional aliases are left out of
/// the JSON object rather than written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub internal_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsid: Option<String>,
    pub spdi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hgvs_full: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hgvsc: Option<String>,
    pub hgvsp_3p: String,
    pub hgvsp_3: String,
    pub hgvsp_1p: String,
    pub hgvsp_1: String,
}

impl VariantRecord {
    /// Aliases in serialization order, with their key names
    pub fn aliases(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::with_capacity(9);
        out.push(("internal_id", self.internal_id.as_str()));
        if let Some(rsid) = &self.rsid {
            out.push(("rsid", rsid.as_str()));
        }
        out.push(("spdi", self.spdi.as_str()));
        if let Some(full) = &self.hgvs_full {
            out.push(("hgvs_full", full.as_str()));
        }
        if let Some(hgvsc) = &self.hgvsc {
            out.push(("hgvsc", hgvsc.as_str()));
        }
        out.push(("hgvsp_3p", self.hgvsp_3p.as_str()));
        out.push(("hgvsp_3", self.hgvsp_3.as_str()));
        out.push(("hgvsp_1p", self.hgvsp_1p.as_str()));
        out.push(("hgvsp_1", self.hgvsp_1.as_str()));
        out
    }

    /// Best single identifier for the variant
    ///
    /// Preference: rsID, full HGVS, 1-letter protein, coding, 3-letter protein,
    /// internal ID.
    pub fn preferred_id(&self) -> &str {
        [
            self.rsid.as_deref(),
            self.hgvs_full.as_deref(),
            Some(self.hgvsp_1.as_str()),
            self.hgvsc.as_deref(),
            Some(self.hgvsp_3.as_str()),
        ]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or(self.internal_id.as_str())
    }

    /// Distinct alias values usable as literature search terms
    ///
    /// Internal identifiers are excluded; order follows the record keys.
    pub fn search_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = Vec::new();
        for (key, value) in self.aliases() {
            if key.starts_with("internal") || value.is_empty() || terms.contains(&value) {
                continue;
            }
            terms.push(value);
        }
        terms
    }
}

/// Where a resolved protein change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProteinSource {
    /// Parsed from the HGVSp column
    Hgvsp,
    /// Rebuilt from `Protein_position` and `Amino_acids`
    AminoAcids,
}

/// A protein change in both code forms, ready for alias formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProtein {
    pub position: u32,
    pub ref_3: String,
    pub alt_3: String,
    pub ref_1: String,
    pub alt_1: String,
    /// `p.` notation used inside `hgvs_full`
    pub notation: String,
    pub source: ProteinSource,
}

impl ResolvedProtein {
    /// `Ala446Thr`
    pub fn change_3(&self) -> String {
        format!("{}{}{}", self.ref_3, self.position, self.alt_3)
    }

    /// `A446T`
    pub fn change_1(&self) -> String {
        format!("{}{}{}", self.ref_1, self.position, self.alt_1)
    }
}

/// Outcome of protein change resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProteinResolution {
    Resolved(ResolvedProtein),
    /// HGVSp marks a synonymous change; no fallback is attempted
    Synonymous,
    /// Neither HGVSp nor the amino-acid columns gave a change
    Unresolved,
}

/// Split ALT into its alternate alleles
///
/// Without a comma the field is returned whole; with commas, blank entries
/// are dropped.
pub fn split_alt_alleles(alt: &str) -> Vec<&str> {
    if alt.contains(',') {
        alt.split(',').map(str::trim).filter(|a| !a.is_empty()).collect()
    } else {
        vec![alt]
    }
}

/// Build an SPDI string from a 1-based position
///
/// # Examples
/// ```
/// use variant_aliases::core::record::build_spdi;
///
/// assert_eq!(build_spdi("chr17", 43106478, "G", "A"), "17:43106477:G:A");
/// ```
pub fn build_spdi(chrom: &str, position: u64, ref_allele: &str, alt_allele: &str) -> String {
    let sequence = chrom.strip_prefix("chr").unwrap_or(chrom);
    format!(
        "{}:{}:{}:{}",
        sequence,
        position.saturating_sub(1),
        ref_allele,
        alt_allele
    )
}

/// First `MANE_SELECT` transcript, if it is a RefSeq mRNA
pub fn mane_transcript(mane_select: &str) -> Option<&str> {
    if is_missing(mane_select) {
        return None;
    }
    mane_select
        .split(',')
        .next()
        .map(str::trim)
        .filter(|transcript| transcript.starts_with(REFSEQ_MRNA_PREFIX))
}

/// Split an `Amino_acids` value (`A/T` or `A>T`) into its two sides
pub fn parse_amino_acids(amino_acids: &str) -> Option<(&str, &str)> {
    if is_missing(amino_acids) {
        return None;
    }

    let (ref_aa, alt_aa) = amino_acids
        .split_once('/')
        .or_else(|| amino_acids.split_once('>'))?;
    let (ref_aa, alt_aa) = (ref_aa.trim(), alt_aa.trim());
    if ref_aa.is_empty() || alt_aa.is_empty() {
        return None;
    }
    Some((ref_aa, alt_aa))
}

/// Three-letter code known to the table, in any case
fn is_three_letter(code: &str) -> bool {
    code.len() == 3 && lookup_three(code).is_some()
}

/// Normalize one side of an amino-acid pair to (three-letter, one-letter)
///
/// A single character is a one-letter code. A known three-letter code is read
/// as such unless it is all uppercase next to a side that is not three-letter:
/// `GLY` in `GLY/G` is the residue string G-L-Y. Residue strings expand one
/// code at a time (`KL` -> `LysLeu`). Anything unknown is kept as written in
/// both forms.
fn both_forms(code: &str, other: &str) -> (String, String) {
    let raw = || (code.to_string(), code.to_string());

    if code.chars().count() == 1 {
        return match lookup_one(code) {
            Some(three) => (three.to_string(), code.to_ascii_uppercase()),
            None => raw(),
        };
    }

    let uppercase = code.bytes().all(|b| b.is_ascii_uppercase() || b == b'*');
    if is_three_letter(code) && (!uppercase || is_three_letter(other)) {
        if let Some(one) = lookup_three(code) {
            let three = lookup_one(one).unwrap_or(code);
            return (three.to_string(), one.to_string());
        }
    }

    if !uppercase {
        return raw();
    }
    let expanded: Option<String> = code
        .chars()
        .map(|residue| lookup_one(residue.encode_utf8(&mut [0u8; 4])))
        .collect();
    match expanded {
        Some(three) => (three, code.to_string()),
        None => raw(),
    }
}

/// Rebuild a protein change from the `Protein_position` and `Amino_acids` columns
pub fn protein_from_amino_acids(
    protein_position: &str,
    amino_acids: &str,
) -> Option<ResolvedProtein> {
    if is_missing(protein_position) {
        return None;
    }
    let position = protein_position.parse::<u32>().ok().filter(|&p| p > 0)?;
    let (ref_aa, alt_aa) = parse_amino_acids(amino_acids)?;

    let (ref_3, ref_1) = both_forms(ref_aa, alt_aa);
    let (alt_3, alt_1) = both_forms(alt_aa, ref_aa);
    let notation = format!("p.{}{}{}", ref_3, position, alt_3);

    Some(ResolvedProtein {
        position,
        ref_3,
        alt_3,
        ref_1,
        alt_1,
        notation,
        source: ProteinSource::AminoAcids,
    })
}

/// Resolve the protein change for a row: HGVSp first, amino-acid columns second
pub fn resolve_protein(fields: &VariantFields) -> ProteinResolution {
    match classify_protein_change(fields.hgvsp) {
        ProteinParse::Parsed(change) => {
            return ProteinResolution::Resolved(ResolvedProtein {
                position: change.position,
                ref_1: convert_3_to_1(&change.ref_aa),
                alt_1: convert_3_to_1(&change.alt_aa),
                ref_3: change.ref_aa,
                alt_3: change.alt_aa,
                notation: strip_reference(fields.hgvsp).to_string(),
                source: ProteinSource::Hgvsp,
            });
        }
        ProteinParse::Synonymous => return ProteinResolution::Synonymous,
        ProteinParse::Missing => debug!("No HGVSp for {}", fields.id),
        ProteinParse::Unrecognized => {}
    }

    match protein_from_amino_acids(fields.protein_position, fields.amino_acids) {
        Some(protein) => {
            debug!(
                "Built protein change for {} from Protein_position and Amino_acids",
                fields.id
            );
            ProteinResolution::Resolved(protein)
        }
        None => ProteinResolution::Unresolved,
    }
}

/// Build the `hgvs_full` string
///
/// # Examples
/// ```
/// use variant_aliases::core::record::build_hgvs_full;
///
/// assert_eq!(
///     build_hgvs_full("BRCA1", Some("NM_007294.4"), Some("c.5123C>A"), "p.Ala1708Glu"),
///     "NM_007294.4(BRCA1):c.5123C>A(p.Ala1708Glu)"
/// );
/// assert_eq!(build_hgvs_full("BRCA1", None, None, "p.Ala1708Glu"), "BRCA1:p.Ala1708Glu");
/// ```
pub fn build_hgvs_full(
    gene: &str,
    mane: Option<&str>,
    coding: Option<&str>,
    protein: &str,
) -> String {
    let reference = match mane {
        Some(transcript) => format!("{}({})", transcript, gene),
        None => gene.to_string(),
    };
    match coding {
        Some(coding) => format!("{}:{}({})", reference, coding, protein),
        None => format!("{}:{}", reference, protein),
    }
}

/// Assemble a record for a row whose position is validated and whose protein
/// change is resolved
pub fn build_record(
    fields: &VariantFields,
    position: u64,
    alt_allele: &str,
    protein: &ResolvedProtein,
) -> VariantRecord {
    let gene = fields.symbol;
    let coding = parse_transcript_change(fields.hgvsc).map(|c| c.change);

    // An unrecognized HGVSp still counts as protein information
    let has_protein_notation =
        protein.source == ProteinSource::Hgvsp || !is_missing(fields.hgvsp);

    let hgvs_full = if coding.is_some() || has_protein_notation {
        Some(build_hgvs_full(
            gene,
            mane_transcript(fields.mane_select),
            coding.as_deref(),
            &protein.notation,
        ))
    } else {
        None
    };

    let change_3 = protein.change_3();
    let change_1 = protein.change_1();

    VariantRecord {
        internal_id: fields.id.to_string(),
        rsid: extract_rsid(fields.existing_variation),
        spdi: build_spdi(fields.chrom, position, fields.ref_allele, alt_allele),
        hgvs_full,
        hgvsc: coding.map(|c| format!("{} {}", gene, c)),
        hgvsp_3p: format!("{} p.{}", gene, change_3),
        hgvsp_3: format!("{} {}", gene, change_3),
        hgvsp_1p: format!("{} p.{}", gene, change_1),
        hgvsp_1: format!("{} {}", gene, change_1),
    }
}

/// Build a record straight from row fields, skipping row validation
///
/// Returns `None` when no protein change can be resolved or ALT has no allele.
pub fn record_from_fields(fields: &VariantFields) -> Option<VariantRecord> {
    let position = parse_position(fields.pos)?;
    let alt_allele = split_alt_alleles(fields.alt).first().copied()?;
    match resolve_protein(fields) {
        ProteinResolution::Resolved(protein) => {
            Some(build_record(fields, position, alt_allele, &protein))
        }
        _ => None,
    }
}
