//! Cascade codes: path strings that encode an organization's position.
//!
//! A node B lies in the subtree of node A (or is A) iff B's code starts
//! with A's code. Generated codes end every segment with `.` so that the
//! tenth child `10.` is never mistaken for a descendant of `1.`.

/// Separator written after every generated segment.
pub const SEGMENT_TERMINATOR: char = '.';

/// Whether `candidate` is `ancestor` itself or one of its descendants.
pub fn covers(ancestor: &str, candidate: &str) -> bool {
    candidate.starts_with(ancestor)
}

/// `code` with its last segment terminated.
pub fn terminated(code: &str) -> String {
    child_base(code)
}

/// The prefix every child code of `parent` starts with.
fn child_base(parent: &str) -> String {
    if parent.is_empty() || parent.ends_with(SEGMENT_TERMINATOR) {
        parent.to_string()
    } else {
        format!("{parent}{SEGMENT_TERMINATOR}")
    }
}

/// Ordinal of `code` when it is a direct child of `base`. Both `N` and
/// `N.` occupy ordinal `N`.
fn child_ordinal(base: &str, code: &str) -> Option<u64> {
    let rest = code.strip_prefix(base)?;
    let segment = rest.strip_suffix(SEGMENT_TERMINATOR).unwrap_or(rest);
    segment.parse().ok()
}

/// Compute the code for a new child of `parent`.
///
/// `existing` may contain any codes from the tenant; only direct,
/// numerically-coded children of `parent` are considered. The new child
/// gets the highest ordinal in use plus one, skipping any ordinal whose
/// code an existing non-ancestor code would cover.
pub fn next_child_code<'a>(parent: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let base = child_base(parent);
    let existing: Vec<&str> = existing.into_iter().collect();
    let mut ordinal = existing
        .iter()
        .filter_map(|code| child_ordinal(&base, code))
        .max()
        .unwrap_or(0)
        + 1;
    loop {
        let candidate = format!("{base}{ordinal}{SEGMENT_TERMINATOR}");
        let claimed = existing
            .iter()
            .any(|code| code.len() > base.len() && covers(code, &candidate));
        if !claimed {
            return candidate;
        }
        ordinal += 1;
    }
}

/// The longest code in `existing`, other than `code` itself, whose
/// subtree contains `code`.
pub fn nearest_ancestor<'a>(
    code: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    existing
        .into_iter()
        .filter(|candidate| *candidate != code && covers(candidate, code))
        .max_by_key(|candidate| candidate.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_relation_defines_subtree() {
        assert!(covers("1.", "1."));
        assert!(covers("1.", "1.1."));
        assert!(covers("1.", "1.1.4."));
        assert!(!covers("1.", "2."));
        assert!(!covers("1.1.", "1."));
        // Terminated segments keep numeric siblings apart.
        assert!(!covers("1.", "10."));
    }

    #[test]
    fn unterminated_codes_use_plain_prefix() {
        assert!(covers("1", "1.1"));
        assert!(!covers("1", "2"));
    }

    #[test]
    fn first_root_and_first_child() {
        assert_eq!(next_child_code("", []), "1.");
        assert_eq!(next_child_code("3.", []), "3.1.");
    }

    #[test]
    fn next_child_skips_past_highest_sibling() {
        let existing = ["1.", "1.1.", "1.2.", "1.2.1.", "1.9.", "2."];
        assert_eq!(next_child_code("1.", existing), "1.10.");
        assert_eq!(next_child_code("", existing), "3.");
        assert_eq!(next_child_code("1.2.", existing), "1.2.2.");
    }

    #[test]
    fn imported_codes_without_terminator_get_one() {
        assert_eq!(next_child_code("1", ["1"]), "1.1.");
        assert_eq!(terminated("1.1"), "1.1.");
        assert_eq!(terminated("1.1."), "1.1.");
    }

    #[test]
    fn unterminated_siblings_occupy_their_ordinal() {
        assert_eq!(next_child_code("", ["1"]), "2.");
        assert_eq!(next_child_code("1", ["1", "1.1"]), "1.2.");
        assert_eq!(next_child_code("1.", ["1.", "1.1", "1.3."]), "1.4.");
    }

    #[test]
    fn generated_code_avoids_unterminated_prefixes() {
        // `1.1` covers `1.10.` to `1.19.`.
        let existing = ["1.", "1.1", "1.9."];
        assert_eq!(next_child_code("1.", existing), "1.20.");
    }

    #[test]
    fn nearest_ancestor_is_the_longest_covering_code() {
        let existing = ["1.", "1.1.", "2.", "1.1.2."];
        assert_eq!(nearest_ancestor("1.1.5.", existing), Some("1.1."));
        assert_eq!(nearest_ancestor("1.1.", existing), Some("1."));
        assert_eq!(nearest_ancestor("3.", existing), None);
    }
}
