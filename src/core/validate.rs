//! Row field validation
//!
//! Sanity checks on the chromosome and position columns that decide whether a
//! row goes any further.

/// Canonical chromosome names, with and without the `chr` prefix
fn is_canonical_chromosome(chrom: &str) -> bool {
    let name = chrom.strip_prefix("chr").unwrap_or(chrom);
    match name {
        "X" | "Y" | "M" | "MT" => true,
        _ => name
            .parse::<u8>()
            .map(|n| (1..=22).contains(&n) && n.to_string() == name)
            .unwrap_or(false),
    }
}

/// Check a chromosome name
///
/// Accepts the canonical names (`chr1`..`chr22`, `chrX`, `chrY`, `chrM`,
/// `chrMT` and their bare forms), and also anything starting with `chr` or
/// made only of digits. The second part is deliberately loose: `chr99` and
/// `chrUn_gl000220` both pass.
///
/// # Examples
/// ```
/// use variant_aliases::core::validate::is_valid_chromosome;
///
/// assert!(is_valid_chromosome("chr17"));
/// assert!(is_valid_chromosome("MT"));
/// assert!(is_valid_chromosome("chr99"));
/// assert!(!is_valid_chromosome("scaffold_1"));
/// ```
pub fn is_valid_chromosome(chrom: &str) -> bool {
    is_canonical_chromosome(chrom)
        || chrom.starts_with("chr")
        || (!chrom.is_empty() && chrom.bytes().all(|b| b.is_ascii_digit()))
}

/// Parse a 1-based genomic position, accepting only integers above zero
pub fn parse_position(pos: &str) -> Option<u64> {
    pos.parse::<i64>()
        .ok()
        .filter(|&value| value > 0)
        .map(|value| value as u64)
}

/// Check a 1-based genomic position
pub fn is_valid_position(pos: &str) -> bool {
    parse_position(pos).is_some()
}
