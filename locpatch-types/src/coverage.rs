use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// How much of the eligible source tree has at least one rule set targeting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub schema: String,

    /// Directory scanned for eligible files, relative to the source root.
    pub scan_dir: Utf8PathBuf,
    pub extensions: Vec<String>,

    /// Number of eligible source files.
    pub eligible: u64,

    /// Distinct non-empty target paths declared by rule sets.
    pub configured: u64,

    /// Eligible files that are also configured.
    pub covered: u64,

    /// `configured / eligible` as a percentage, one decimal place.
    pub percentage: f64,

    /// Eligible files with no rule set, excluding skip-listed ones.
    #[serde(default)]
    pub uncovered: Vec<Utf8PathBuf>,

    /// Eligible files with no rule set that the skip list marks as intentionally untranslated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<Utf8PathBuf>,
}

/// Percentage of `part` in `whole`, rounded to one decimal place.
///
/// An empty `whole` counts as fully covered.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 100.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::percentage;

    #[test]
    fn four_of_ten_is_forty_percent() {
        assert_eq!(percentage(4, 10), 40.0);
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
    }

    #[test]
    fn empty_whole_is_full_coverage() {
        assert_eq!(percentage(0, 0), 100.0);
    }

    #[test]
    fn configured_beyond_eligible_is_not_clamped() {
        assert_eq!(percentage(3, 2), 150.0);
    }
}
