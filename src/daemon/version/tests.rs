use super::*;

#[test]
fn dev_is_never_outdated() {
    assert!(!is_outdated("dev", "v1.2.3"));
}

#[test]
fn differing_tags_are_outdated() {
    assert!(is_outdated("0.1.0", "v0.2.0"));
}

#[test]
fn matching_tags_are_current() {
    assert!(!is_outdated("0.1.0", "0.1.0"));
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert!(!is_outdated("0.1.0", "  0.1.0\n"));
}
