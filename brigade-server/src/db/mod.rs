//! Database access layer
//!
//! Every tenant query filters on `restaurant_id`; rows of another
//! restaurant are indistinguishable from missing rows.

pub mod advances;
pub mod ai_reviews;
pub mod attendance;
pub mod audit;
pub mod dashboard;
pub mod payslips;
pub mod restaurants;
pub mod sops;
pub mod staff_requests;
pub mod tasks;
pub mod users;
pub mod vouchers;

/// `%term%` for ILIKE search, with LIKE metacharacters escaped
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Empty search strings behave as no filter
pub fn search_pattern(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.trim().is_empty()).map(like_pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_escaping() {
        assert_eq!(like_pattern(" ana "), "%ana%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(search_pattern(Some("  ")), None);
        assert_eq!(search_pattern(None), None);
    }
}
