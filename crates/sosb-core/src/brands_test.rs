use std::path::Path;

use super::*;

fn brands_file(brands: Vec<Brand>) -> BrandsFile {
    BrandsFile { brands }
}

#[test]
fn new_brand_starts_with_blank_placeholder() {
    let brand = Brand::new("Acme", true);
    assert_eq!(brand.keywords(), [String::new()]);
    assert!(brand.color().is_none());
    assert!(!brand.is_qualifying());
}

#[test]
fn with_keywords_empty_keeps_placeholder() {
    let brand = Brand::new("Acme", true).with_keywords(Vec::<String>::new());
    assert_eq!(brand.keywords(), [String::new()]);
}

#[test]
fn remove_last_keyword_leaves_placeholder() {
    let mut brand = Brand::new("Acme", true).with_keywords(["acme"]);
    assert!(brand.remove_keyword(0));
    assert_eq!(brand.keywords(), [String::new()]);
}

#[test]
fn remove_keyword_out_of_range_is_rejected() {
    let mut brand = Brand::new("Acme", true).with_keywords(["acme", "acme shop"]);
    assert!(!brand.remove_keyword(5));
    assert_eq!(brand.keywords().len(), 2);
}

#[test]
fn set_keyword_overwrites_in_place() {
    let mut brand = Brand::new("Acme", true).with_keywords(["acme", "old"]);
    assert!(brand.set_keyword(1, "acme shop"));
    assert!(!brand.set_keyword(2, "missing"));
    assert_eq!(brand.keywords(), ["acme", "acme shop"]);
}

#[test]
fn add_keyword_appends() {
    let mut brand = Brand::new("Acme", true).with_keywords(["acme"]);
    brand.add_keyword("");
    assert_eq!(brand.keywords(), ["acme", ""]);
}

#[test]
fn set_keywords_from_text_trims_and_drops_blank_lines() {
    let mut brand = Brand::new("Acme", true);
    brand.set_keywords_from_text("  acme \n\n acme shop\n   \n");
    assert_eq!(brand.keywords(), ["acme", "acme shop"]);

    brand.set_keywords_from_text("\n  \n");
    assert_eq!(brand.keywords(), [String::new()]);
}

#[test]
fn qualifying_requires_name_and_keyword() {
    let unnamed = Brand::new("  ", true).with_keywords(["acme"]);
    let blank_keywords = Brand::new("Acme", true).with_keywords(["", "   "]);
    let valid = Brand::new("Acme", true).with_keywords(["", " acme "]);

    assert!(!unnamed.is_qualifying());
    assert!(!blank_keywords.is_qualifying());
    assert!(valid.is_qualifying());
    assert_eq!(valid.qualifying_keywords(), ["acme"]);
}

#[test]
fn color_is_assigned_once() {
    let mut brand = Brand::new("Acme", true).with_color("#1f77b4");
    assert!(!brand.assign_color("#ff7f0e"));
    assert_eq!(brand.color(), Some("#1f77b4"));
}

#[test]
fn deserialize_fills_defaults() {
    let brand: Brand = serde_yaml::from_str("name: Acme\nkeywords: []\n").unwrap();
    assert_eq!(brand.name, "Acme");
    assert_eq!(brand.keywords(), [String::new()]);
    assert!(!brand.is_own_brand);
    assert!(brand.color().is_none());

    let brand: Brand = serde_yaml::from_str("name: Globex\n").unwrap();
    assert_eq!(brand.keywords(), [String::new()]);
}

#[test]
fn is_valid_color_accepts_short_and_long_hex() {
    assert!(is_valid_color("#fff"));
    assert!(is_valid_color("#1f77b4"));
    assert!(!is_valid_color("1f77b4"));
    assert!(!is_valid_color("#12345"));
    assert!(!is_valid_color("#gggggg"));
}

#[test]
fn validate_rejects_duplicate_name_case_insensitive() {
    let file = brands_file(vec![
        Brand::new("Acme", true).with_keywords(["acme"]),
        Brand::new(" acme ", false).with_keywords(["acme inc"]),
    ]);
    let err = validate_brands(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate brand name"));
}

#[test]
fn validate_rejects_invalid_color() {
    let file = brands_file(vec![Brand::new("Acme", true).with_color("blue")]);
    let err = validate_brands(&file).unwrap_err();
    assert!(err.to_string().contains("invalid color"));
}

#[test]
fn validate_allows_multiple_unnamed_rows() {
    let file = brands_file(vec![Brand::new("", true), Brand::new("", false)]);
    assert!(validate_brands(&file).is_ok());
}

#[test]
fn load_brands_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("brands.yaml");
    assert!(
        path.exists(),
        "brands.yaml missing at {path:?}; required for this test"
    );
    let result = load_brands(&path);
    assert!(result.is_ok(), "failed to load brands.yaml: {result:?}");
    let brands_file = result.unwrap();
    assert!(brands_file.brands.iter().any(|b| b.is_own_brand));
    assert!(brands_file.brands.iter().all(Brand::is_qualifying));
}

#[test]
fn load_brands_reports_missing_file() {
    let err = load_brands(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::BrandsFileIo { .. }));
}
