use pretty_assertions::assert_eq;
use stylemin::{CompatibilityProfile, Config, Level2Options, minify};

fn min(input: &str) -> String {
    minify(input, &Config::default())
}

#[test]
fn test_longhands_merge_into_margin() {
    assert_eq!(
        min("a{margin-top:10px;margin-right:5px;margin-bottom:3px;margin-left:2px}"),
        "a{margin:10px 5px 3px 2px}"
    );
}

#[test]
fn test_background_absorbs_attachment() {
    assert_eq!(min("a{background:0;background-attachment:fixed}"), "a{background:0 fixed}");
    assert_eq!(
        min("a{background:0;background-attachment:inherit}"),
        "a{background:0;background-attachment:inherit}"
    );
}

#[test]
fn test_border_absorbs_style() {
    assert_eq!(min("a{border:1px solid red;border-style:dotted}"), "a{border:1px dotted red}");
}

#[test]
fn test_non_adjacent_duplicate_dropped() {
    assert_eq!(min("a{color:red}div{color:blue}a{color:red}"), "div{color:#00f}a{color:red}");
}

#[test]
fn test_identical_media_preludes_merge() {
    assert_eq!(
        min("@media screen{a{color:red}}@media screen{div{display:block}}"),
        "@media screen{a{color:red}div{display:block}}"
    );
}

#[test]
fn test_important_component_merge() {
    assert_eq!(
        min("a{border-color:#123!important;border-top-color:#456!important}"),
        "a{border-color:#456 #123 #123!important}"
    );
}

#[test]
fn test_four_value_collapse_forms() {
    assert_eq!(min("a{padding:1px 1px 1px 1px}"), "a{padding:1px}");
    assert_eq!(min("a{padding:1px 2px 1px 2px}"), "a{padding:1px 2px}");
    assert_eq!(min("a{padding:1px 2px 3px 2px}"), "a{padding:1px 2px 3px}");
}

#[test]
fn test_hacks_are_separate_namespaces() {
    assert_eq!(min("a{width:1px;*width:2px}"), "a{width:1px;*width:2px}");
}

#[test]
fn test_fallback_kept_for_older_engines() {
    assert_eq!(
        min("a{color:red;color:rgba(0,0,0,.5)}"),
        "a{color:red;color:rgba(0,0,0,.5)}"
    );
}

#[test]
fn test_merging_disabled_by_profile() {
    let compatibility: CompatibilityProfile = "*,-properties.merging".parse().unwrap();
    let config = Config::new(compatibility, Level2Options::default());
    assert_eq!(
        minify("a{margin-top:1px;margin-right:1px;margin-bottom:1px;margin-left:1px}", &config),
        "a{margin-top:1px;margin-right:1px;margin-bottom:1px;margin-left:1px}"
    );
}

#[test]
fn test_special_selectors_never_merge() {
    assert_eq!(
        min("a{color:red}input::-moz-placeholder{color:red}"),
        "a{color:red}input::-moz-placeholder{color:red}"
    );
}

#[test]
fn test_level2_off_keeps_structure() {
    let config = Config::new(CompatibilityProfile::default(), Level2Options::none());
    assert_eq!(
        minify("a{color:#ff0000}a{margin:0px}", &config),
        "a{color:red}a{margin:0}"
    );
}

#[test]
fn test_nested_rules_are_preserved() {
    assert_eq!(min("a{color:red;&:hover{color:blue}}"), "a{color:red;&:hover{color:blue}}");
    assert_eq!(min("a{&:hover{color:red}}"), "a{&:hover{color:red}}");
    let once = min(".a{color:red}.x{& .y{top:0}}.a{margin:0}");
    assert_eq!(once, ".a{color:red}.x{& .y{top:0}}.a{margin:0}");
    assert_eq!(min(&once), once);
}

#[test]
fn test_empty_layer_fixes_layer_order() {
    assert_eq!(
        min("@layer base{}@layer theme{a{color:red}}@layer base{a{color:blue}}"),
        "@layer base{}@layer theme{a{color:red}}@layer base{a{color:#00f}}"
    );
}

#[test]
fn test_empty_custom_property_kept() {
    assert_eq!(min("a{--x:;color:red}"), "a{--x:;color:red}");
}
