//! Domain expansion: www. variants, dedupe, byte-order sort.

use hostguard::domain;

#[test]
fn adds_www_variant() {
    assert_eq!(
        domain::expand(&["example.com"]),
        vec!["example.com", "www.example.com"]
    );
}

#[test]
fn prefixed_domain_is_not_doubled() {
    let expanded = domain::expand(&["www.example.com"]);
    assert_eq!(expanded, vec!["www.example.com"]);
    assert!(!expanded.iter().any(|d| d.starts_with("www.www.")));
}

#[test]
fn trims_dedupes_drops_empty_and_sorts() {
    let expanded = domain::expand(&["  b.org ", "", "   ", "b.org", "www.b.org", "a.net"]);
    assert_eq!(expanded, vec!["a.net", "b.org", "www.a.net", "www.b.org"]);
}

#[test]
fn every_bare_domain_has_its_www_form() {
    let raw = ["x.io", "www.y.io", "z.co.uk"];
    let expanded = domain::expand(&raw);
    for d in raw.iter().filter(|d| !d.starts_with("www.")) {
        assert!(expanded.contains(&format!("www.{d}")), "missing www.{d}");
    }
}

#[test]
fn clean_keeps_raw_order() {
    assert_eq!(domain::clean(&[" b.com", "", "a.com "]), vec!["b.com", "a.com"]);
}

#[test]
fn parse_list_skips_comments_and_blanks() {
    let text = "# starter list\n a.com \n\n# another comment\nb.com\n";
    assert_eq!(domain::parse_domain_list(text), vec!["a.com", "b.com"]);
}
