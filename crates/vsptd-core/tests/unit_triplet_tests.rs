//! Unit tests for the triplet model
//!
//! Tests triplets, triplet strings and settings through the public API

use std::sync::Arc;
use vsptd_core::*;

// =============================================================================
// Triplet Tests
// =============================================================================

#[test]
fn test_triplet_basic_render() {
    let trp = Triplet::new("A", "B", "C").unwrap();
    assert_eq!(trp.to_text(), "$A.B='C';");
}

#[test]
fn test_triplet_reference_render() {
    let trp = Triplet::new("A", "B", Triplet::reference("C", "D").unwrap()).unwrap();
    assert_eq!(trp.to_string(), "$A.B=$C.D;");
}

#[test]
fn test_triplet_accessors() -> anyhow::Result<()> {
    let trp = Triplet::builder("P1")
        .name("N")
        .value(10)
        .comment("ten")
        .build()?;

    assert_eq!(trp.prefix(), "P1");
    assert_eq!(trp.name(), Some("N"));
    assert_eq!(trp.value(), Some(&TripletValue::Int(10)));
    assert_eq!(trp.comment(), Some("ten"));
    assert!(!trp.is_bid());
    assert!(!trp.is_special());
    assert_eq!(trp.key(), ("P1".to_string(), Some("N".to_string())));
    Ok(())
}

#[test]
fn test_prefix_length_boundary() {
    assert!(Triplet::reference(&"A".repeat(25), "B").is_ok());

    let err = Triplet::reference(&"A".repeat(26), "B").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Length);
}

#[test]
fn test_prefix_non_latin_is_format_error() {
    let err = Triplet::reference("ПРЕФ", "B").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_bool_value_is_type_error() {
    let err = Triplet::new("A", "B", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn test_comment_length_error() {
    let err = Triplet::builder("A")
        .name("B")
        .comment(&"c".repeat(257))
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Length);
}

#[test]
fn test_triplet_debug_omits_defaults() {
    let trp = Triplet::new("A", "B", 1).unwrap();
    let debug = format!("{:?}", trp);
    assert!(debug.contains("prefix: \"A\""));
    assert!(!debug.contains("bid"));
    assert!(!debug.contains("settings"));
}

// =============================================================================
// TripletString Tests
// =============================================================================

fn abc() -> TripletString {
    vec![
        Triplet::new("A", "B", "C").unwrap(),
        Triplet::new("A", "D", "C").unwrap(),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_update_preserves_position() {
    let mut s = abc();
    s.add(Triplet::new("A", "B", "E").unwrap());

    let items: Vec<Triplet> = s.into_iter().collect();
    assert_eq!(
        items,
        vec![
            Triplet::new("A", "B", "E").unwrap(),
            Triplet::new("A", "D", "C").unwrap(),
        ]
    );
}

#[test]
fn test_append_on_new() {
    let mut s = abc();
    s.add(Triplet::new("D", "B", "E").unwrap());

    let items: Vec<Triplet> = s.into_iter().collect();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2], Triplet::new("D", "B", "E").unwrap());
}

#[test]
fn test_key_uniqueness() {
    let mut s = TripletString::new();
    for i in 0..5 {
        s.add(Triplet::new("A", "B", i).unwrap());
    }
    assert_eq!(s.len(), 1);
    assert_eq!(s.get("A", "B").unwrap().value(), Some(&TripletValue::Int(4)));
}

#[test]
fn test_getpr_non_strict_and_strict() {
    let s: TripletString = vec![
        Triplet::new("E", "X", 1).unwrap(),
        Triplet::new("E1", "Y", 2).unwrap(),
    ]
    .into_iter()
    .collect();

    assert_eq!(s.getpr("E", false).unwrap().len(), 2);
    assert_eq!(s.getpr("E", true).unwrap().len(), 1);
}

#[test]
fn test_borrowed_iteration() {
    let s = abc();
    let mut names = Vec::new();
    for trp in &s {
        names.push(trp.name().unwrap_or_default().to_string());
    }
    assert_eq!(names, vec!["B", "D"]);
}

#[test]
fn test_custom_separator() {
    let mut settings = Settings::default();
    settings.triplets_separator = "|".to_string();
    let settings = Arc::new(settings);

    let mut s = TripletString::with_settings(Arc::clone(&settings));
    s.add(Triplet::builder("A").name("B").value(1).settings(Arc::clone(&settings)).build().unwrap());
    s.add(Triplet::builder("C").name("D").value(2).settings(settings).build().unwrap());
    assert_eq!(s.to_string(), "$A.B=1;|$C.D=2;");
}

// =============================================================================
// Settings Tests
// =============================================================================

#[test]
fn test_settings_yaml_partial_document() -> anyhow::Result<()> {
    let settings = Settings::from_yaml_str("bid: \"*\"\nprefix:\n  min: 1\n  max: 3\n  pattern: null\n  types: [str]\n")?;
    assert_eq!(settings.bid, "*");
    assert_eq!(settings.prefix.max, 3);
    assert_eq!(settings.prefix.pattern, None);
    assert_eq!(settings.name, Settings::default().name);

    let settings = Arc::new(settings);
    let err = Triplet::builder("ABCD").settings(settings).build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Length);
    Ok(())
}

#[test]
fn test_settings_bad_yaml() {
    let err = Settings::from_yaml_str("prefix: [1, 2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Settings);
}
