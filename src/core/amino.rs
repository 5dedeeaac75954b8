//! Amino-acid code utilities
//!
//! Bidirectional mapping between three-letter and one-letter amino-acid
//! codes, including the stop codon and the unknown residue.

use std::fmt;

/// Three-letter to one-letter code table.
///
/// `Stop` is accepted on input; `Ter` is the canonical three-letter stop code.
#[rustfmt::skip]
const AA_TABLE: &[(&str, &str)] = &[
    ("Ala", "A"), ("Arg", "R"), ("Asn", "N"), ("Asp", "D"),
    ("Cys", "C"), ("Gln", "Q"), ("Glu", "E"), ("Gly", "G"),
    ("His", "H"), ("Ile", "I"), ("Leu", "L"), ("Lys", "K"),
    ("Met", "M"), ("Phe", "F"), ("Pro", "P"), ("Ser", "S"),
    ("Thr", "T"), ("Trp", "W"), ("Tyr", "Y"), ("Val", "V"),
    ("Ter", "*"), ("Stop", "*"), ("Xaa", "X"),
];

/// One-letter stop codon
pub const STOP_1: &str = "*";

/// Three-letter stop codon
pub const STOP_3: &str = "Ter";

/// Tokens that stand for an edit type rather than a residue
const SYMBOLIC_TOKENS: [&str; 5] = ["del", "ins", "dup", "fs", "ext"];

/// Suffixes that combine with a residue code (`Glyfs`, `Leuext`)
const COMPOSITE_SUFFIXES: [&str; 2] = ["fs", "ext"];

/// Result of an amino-acid code conversion
///
/// Both variants are valid conversion output: an unknown code is carried
/// through unchanged so an otherwise usable row is never rejected over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AaCode {
    /// The code (or its residue part) was found in the table
    Mapped(String),
    /// The code is not in the table and is returned as given
    Unmapped(String),
}

impl AaCode {
    pub fn as_str(&self) -> &str {
        match self {
            AaCode::Mapped(code) | AaCode::Unmapped(code) => code,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            AaCode::Mapped(code) | AaCode::Unmapped(code) => code,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, AaCode::Mapped(_))
    }
}

impl fmt::Display for AaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capitalize the first character and lowercase the rest (`ALA` -> `Ala`)
fn capitalize(code: &str) -> String {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Look up the one-letter code for a three-letter code (case-insensitive)
pub fn lookup_three(code: &str) -> Option<&'static str> {
    let code = capitalize(code);
    AA_TABLE
        .iter()
        .find(|(three, _)| *three == code)
        .map(|(_, one)| *one)
}

/// Look up the three-letter code for a one-letter code (case-insensitive)
///
/// The stop codon always maps to `Ter`.
pub fn lookup_one(code: &str) -> Option<&'static str> {
    if code == STOP_1 {
        return Some(STOP_3);
    }
    let code = code.to_ascii_uppercase();
    AA_TABLE
        .iter()
        .find(|(_, one)| *one == code)
        .map(|(three, _)| *three)
}

/// Split a composite token into its residue part and suffix
fn split_composite(code: &str) -> Option<(&str, &'static str)> {
    COMPOSITE_SUFFIXES.iter().find_map(|suffix| {
        code.strip_suffix(suffix)
            .filter(|residue| !residue.is_empty())
            .map(|residue| (residue, *suffix))
    })
}

fn convert_with(code: &str, lookup: fn(&str) -> Option<&'static str>) -> AaCode {
    if SYMBOLIC_TOKENS.contains(&code) {
        return AaCode::Mapped(code.to_string());
    }

    if let Some((residue, suffix)) = split_composite(code) {
        return match lookup(residue) {
            Some(mapped) => AaCode::Mapped(format!("{}{}", mapped, suffix)),
            None => AaCode::Unmapped(code.to_string()),
        };
    }

    match lookup(code) {
        Some(mapped) => AaCode::Mapped(mapped.to_string()),
        None => AaCode::Unmapped(code.to_string()),
    }
}

/// Convert a three-letter code to its one-letter form
///
/// # Examples
/// ```
/// use variant_aliases::core::amino::three_to_one;
///
/// assert_eq!(three_to_one("Ala").as_str(), "A");
/// assert_eq!(three_to_one("Ter").as_str(), "*");
/// assert_eq!(three_to_one("Glyfs").as_str(), "Gfs");
/// assert_eq!(three_to_one("del").as_str(), "del");
/// assert!(!three_to_one("Sec").is_mapped());
/// ```
pub fn three_to_one(code: &str) -> AaCode {
    convert_with(code, lookup_three)
}

/// Convert a one-letter code to its three-letter form
///
/// # Examples
/// ```
/// use variant_aliases::core::amino::one_to_three;
///
/// assert_eq!(one_to_three("A").as_str(), "Ala");
/// assert_eq!(one_to_three("*").as_str(), "Ter");
/// assert_eq!(one_to_three("Lext").as_str(), "Leuext");
/// ```
pub fn one_to_three(code: &str) -> AaCode {
    convert_with(code, lookup_one)
}

/// String form of [`three_to_one`]
pub fn convert_3_to_1(code: &str) -> String {
    three_to_one(code).into_string()
}

/// String form of [`one_to_three`]
pub fn convert_1_to_3(code: &str) -> String {
    one_to_three(code).into_string()
}

/// All one-letter codes known to the table
pub fn one_letter_codes() -> impl Iterator<Item = &'static str> {
    AA_TABLE
        .iter()
        .filter(|(three, _)| *three != "Stop")
        .map(|(_, one)| *one)
}

/// All canonical three-letter codes known to the table (`Stop` excluded)
pub fn three_letter_codes() -> impl Iterator<Item = &'static str> {
    AA_TABLE
        .iter()
        .filter(|(three, _)| *three != "Stop")
        .map(|(three, _)| *three)
}
