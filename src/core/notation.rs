//! HGVS notation parsing
//!
//! Parses the protein (`HGVSp`), coding (`HGVSc`) and `Existing_variation`
//! columns of VEP output into structured values.
//!
//! Protein changes are matched by an ordered list of rules, one per notation
//! shape. Rules are tried most-specific first and the first match wins; each
//! rule is a plain function and can be exercised on its own.

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

/// Placeholder VEP writes for an empty annotation
pub const EMPTY_VALUE: &str = "-";

static SUBSTITUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:]+):p\.?\(?([A-Za-z]{3})([0-9]+)([A-Za-z]{3}|\*)\)?$").unwrap()
});

static FRAMESHIFT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:]+):p\.?\(?([A-Za-z]{3})([0-9]+)([A-Za-z]{3})fs(?:Ter([0-9]+))?").unwrap()
});

static DELETION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:]+):p\.?\(?([A-Za-z]{3})([0-9]+)(?:_[A-Za-z]{3}[0-9]+)?del").unwrap()
});

static INSERTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:]+):p\.?\(?([A-Za-z]{3})([0-9]+)_[A-Za-z]{3}[0-9]+ins[A-Za-z]+").unwrap()
});

static DUPLICATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:]+):p\.?\(?([A-Za-z]{3})([0-9]+)(?:_[A-Za-z]{3}[0-9]+)?dup").unwrap()
});

static EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:]+):p\.?\(?\*([0-9]+)([A-Za-z]{3})ext").unwrap()
});

/// Protein change category, named after the rule that matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Substitution,
    Frameshift,
    Deletion,
    Insertion,
    Duplication,
    Extension,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Substitution => "substitution",
            ChangeKind::Frameshift => "frameshift",
            ChangeKind::Deletion => "deletion",
            ChangeKind::Insertion => "insertion",
            ChangeKind::Duplication => "duplication",
            ChangeKind::Extension => "extension",
        };
        f.write_str(name)
    }
}

/// A parsed protein-level change
///
/// `ref_aa` and `alt_aa` are three-letter codes or symbolic tokens
/// (`del`, `ins`, `dup`, `<AA>fs`, `<AA>ext`, `*`). Neither is ever empty and
/// `position` is never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinChange {
    pub protein_id: String,
    pub position: u32,
    pub ref_aa: String,
    pub alt_aa: String,
    pub kind: ChangeKind,
}

/// A coding change split at the first colon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptChange {
    pub transcript_id: String,
    /// Everything after the first colon (`c.1336G>A`), not interpreted further
    pub change: String,
}

/// Outcome of classifying an HGVSp string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProteinParse {
    /// A recognised protein change
    Parsed(ProteinChange),
    /// A synonymous change (`p.Gly22=`), skipped on purpose
    Synonymous,
    /// Empty or `-`
    Missing,
    /// No rule matched
    Unrecognized,
}

/// A single notation-shape rule
pub type ProteinRule = fn(&str) -> Option<ProteinChange>;

/// Rules in priority order
pub const PROTEIN_RULES: [(ChangeKind, ProteinRule); 6] = [
    (ChangeKind::Substitution, match_substitution),
    (ChangeKind::Frameshift, match_frameshift),
    (ChangeKind::Deletion, match_deletion),
    (ChangeKind::Insertion, match_insertion),
    (ChangeKind::Duplication, match_duplication),
    (ChangeKind::Extension, match_extension),
];

/// Check for a missing annotation value (empty or `-`)
#[inline]
pub fn is_missing(value: &str) -> bool {
    value.is_empty() || value == EMPTY_VALUE
}

/// Parse a protein position, rejecting zero and values that overflow
fn parse_position(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|&pos| pos > 0)
}

/// Build a change from captures laid out as (id, ref, position, ...)
fn change_from(caps: &Captures, alt_aa: String, kind: ChangeKind) -> Option<ProteinChange> {
    Some(ProteinChange {
        protein_id: caps.get(1)?.as_str().to_string(),
        position: parse_position(caps.get(3)?.as_str())?,
        ref_aa: caps.get(2)?.as_str().to_string(),
        alt_aa,
        kind,
    })
}

/// `ENSP..:p.Ala446Thr`, `ENSP..:p.(Ala446Thr)`, `ENSP..:p.Trp24*`
pub fn match_substitution(hgvsp: &str) -> Option<ProteinChange> {
    let caps = SUBSTITUTION.captures(hgvsp)?;
    let alt_aa = caps.get(4)?.as_str().to_string();
    change_from(&caps, alt_aa, ChangeKind::Substitution)
}

/// `ENSP..:p.Glu386GlyfsTer6`; the Ter distance is not kept
pub fn match_frameshift(hgvsp: &str) -> Option<ProteinChange> {
    let caps = FRAMESHIFT.captures(hgvsp)?;
    let alt_aa = format!("{}fs", caps.get(4)?.as_str());
    change_from(&caps, alt_aa, ChangeKind::Frameshift)
}

/// `ENSP..:p.Asp999_Ser1001del`, `ENSP..:p.Lys5del`
pub fn match_deletion(hgvsp: &str) -> Option<ProteinChange> {
    let caps = DELETION.captures(hgvsp)?;
    change_from(&caps, "del".to_string(), ChangeKind::Deletion)
}

/// `ENSP..:p.Pro270_Ala271insLysLeu`
pub fn match_insertion(hgvsp: &str) -> Option<ProteinChange> {
    let caps = INSERTION.captures(hgvsp)?;
    change_from(&caps, "ins".to_string(), ChangeKind::Insertion)
}

/// `ENSP..:p.Gln34_Gln38dup`, `ENSP..:p.Gln34dup`
pub fn match_duplication(hgvsp: &str) -> Option<ProteinChange> {
    let caps = DUPLICATION.captures(hgvsp)?;
    change_from(&caps, "dup".to_string(), ChangeKind::Duplication)
}

/// `ENSP..:p.*110Leuext*17`; the reference residue is always the stop codon
pub fn match_extension(hgvsp: &str) -> Option<ProteinChange> {
    let caps = EXTENSION.captures(hgvsp)?;
    Some(ProteinChange {
        protein_id: caps.get(1)?.as_str().to_string(),
        position: parse_position(caps.get(2)?.as_str())?,
        ref_aa: "*".to_string(),
        alt_aa: format!("{}ext", caps.get(3)?.as_str()),
        kind: ChangeKind::Extension,
    })
}

/// Classify an HGVSp string
///
/// `%3D` is decoded to `=` first; any `=` marks a synonymous change.
pub fn classify_protein_change(hgvsp: &str) -> ProteinParse {
    if is_missing(hgvsp) {
        return ProteinParse::Missing;
    }

    let decoded = hgvsp.replace("%3D", "=");
    if decoded.contains('=') {
        debug!("Skipping synonymous variant: {}", decoded);
        return ProteinParse::Synonymous;
    }

    for (_, rule) in PROTEIN_RULES.iter() {
        if let Some(change) = rule(&decoded) {
            return ProteinParse::Parsed(change);
        }
    }

    warn!("Could not parse HGVSp notation: {}", hgvsp);
    ProteinParse::Unrecognized
}

/// Parse an HGVSp string into a protein change
///
/// # Examples
/// ```
/// use variant_aliases::core::notation::parse_protein_change;
///
/// let change = parse_protein_change("ENSP00000478421.2:p.Ala446Thr").unwrap();
/// assert_eq!(change.protein_id, "ENSP00000478421.2");
/// assert_eq!(change.position, 446);
/// assert_eq!(change.ref_aa, "Ala");
/// assert_eq!(change.alt_aa, "Thr");
///
/// assert!(parse_protein_change("ENSP00000478421.2:p.Gly22%3D").is_none());
/// assert!(parse_protein_change("-").is_none());
/// ```
pub fn parse_protein_change(hgvsp: &str) -> Option<ProteinChange> {
    match classify_protein_change(hgvsp) {
        ProteinParse::Parsed(change) => Some(change),
        _ => None,
    }
}

/// Split an HGVSc string into transcript and change
pub fn parse_transcript_change(hgvsc: &str) -> Option<TranscriptChange> {
    if is_missing(hgvsc) {
        return None;
    }

    match hgvsc.split_once(':') {
        Some((transcript_id, change)) => Some(TranscriptChange {
            transcript_id: transcript_id.to_string(),
            change: change.to_string(),
        }),
        None => {
            warn!("Could not parse HGVSc notation: {}", hgvsc);
            None
        }
    }
}

/// Find the first dbSNP identifier in a comma-separated `Existing_variation`
///
/// # Examples
/// ```
/// use variant_aliases::core::notation::extract_rsid;
///
/// assert_eq!(extract_rsid("COSV123, rs80357382").as_deref(), Some("rs80357382"));
/// assert_eq!(extract_rsid("COSV123"), None);
/// assert_eq!(extract_rsid("-"), None);
/// ```
pub fn extract_rsid(existing_variation: &str) -> Option<String> {
    if is_missing(existing_variation) {
        return None;
    }

    let found = existing_variation
        .split(',')
        .map(str::trim)
        .find(|token| is_rsid(token))
        .map(str::to_string);

    match &found {
        Some(rsid) => debug!("Found rsID: {}", rsid),
        None => debug!("No rsID found in: {}", existing_variation),
    }
    found
}

/// `rs` (any case) followed by one or more ASCII digits
fn is_rsid(token: &str) -> bool {
    match (token.get(..2), token.get(2..)) {
        (Some(prefix), Some(digits)) => {
            prefix.eq_ignore_ascii_case("rs")
                && !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

/// Drop the reference-sequence prefix from a notation (`NM_1.2:c.5A>G` -> `c.5A>G`)
pub fn strip_reference(notation: &str) -> &str {
    notation
        .split_once(':')
        .map(|(_, change)| change)
        .unwrap_or(notation)
}
