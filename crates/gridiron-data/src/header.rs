//! Header lookup shared by the table loaders.

use csv::StringRecord;

/// Normalize a header for comparison: trimmed and lowercased.
pub(crate) fn normalize(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Find the first column whose normalized header equals any of `names`.
pub(crate) fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|name| normalize(h) == normalize(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_column_ignores_case_and_padding() {
        let headers = StringRecord::from(vec!["  TEAM ", "2023", "2024"]);
        assert_eq!(find_column(&headers, &["team"]), Some(0));
        assert_eq!(find_column(&headers, &["year"]), None);
    }
}
