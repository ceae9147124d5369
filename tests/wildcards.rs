use json_rule_validation as jrv;
use jrv::{FieldRules, ValidateOptions};
use pretty_assertions::assert_eq;
use serde_json::json;

fn dot_style_rules() -> FieldRules {
    FieldRules::new()
        .field("name", "required|string|min:5")
        .field("addresses.*.street", "required|string|min:3|ends_with:st")
        .field("tags.*", "required|string|min:3")
}

#[test]
fn test_dot_style_success_keeps_shape() {
    let data = json!({
        "name": "whataname",
        "addresses": [
            {"street": "1 street name st"},
            {"street": "2 street name st"},
        ],
        "age": "integer|min:18",
        "tags": ["first", "second", "third"],
    });
    let out = jrv::validate(&dot_style_rules(), &data, &ValidateOptions::default()).unwrap();
    assert!(out.violations.is_empty());
    assert_eq!(
        out.data,
        json!({
            "name": "whataname",
            "addresses": [
                {"street": "1 street name st"},
                {"street": "2 street name st"},
            ],
            "tags": ["first", "second", "third"],
        })
    );
}

#[test]
fn test_dot_style_violations_by_index() {
    let data = json!({
        "name": "whataname",
        "addresses": [
            {"street": "1 street name st"},
            {"street": "2 street name"},
        ],
    });
    let out = jrv::validate(&dot_style_rules(), &data, &ValidateOptions::default()).unwrap();
    assert_eq!(
        out.violations.into_value(),
        json!({
            "addresses": {"1": {"street": ["This value should ends with [st]."]}},
            "tags": {"0": ["This value should not be blank."]},
        })
    );
    assert_eq!(out.data, json!({"name": "whataname"}));
}

#[test]
fn test_short_tag_fails_at_its_index() {
    let rules = FieldRules::new().field("tags.*", "required|string|min:3");
    let out = jrv::validate(&rules, &json!({"tags": ["ab"]}), &ValidateOptions::default()).unwrap();
    assert_eq!(out.violations.messages("tags.0"), vec!["This value should not less than 3."]);
}

#[test]
fn test_nested_dataset() {
    let rules = FieldRules::new()
        .field("user.*.options.*.name", "required|min:3")
        .field("data.*.optional", "exclude_if:data,null|optional|min:3");

    let data = json!({
        "user": [
            {"options": [{"name": "first"}, {"name": "second"}]},
        ],
    });
    let out = jrv::validate(&rules, &data, &ValidateOptions::default()).unwrap();
    assert_eq!(
        out.data,
        json!({
            "user": [
                {"options": [{"name": "first"}, {"name": "second"}]},
            ],
            "data": [],
        })
    );

    let data = json!({"data": [{"optional": "1"}]});
    let out = jrv::validate(&rules, &data, &ValidateOptions::default()).unwrap();
    assert_eq!(
        out.violations.into_value(),
        json!({
            "user": {"0": {"options": {"0": {"name": ["This value should not be blank."]}}}},
            "data": {"0": {"optional": ["This value should not less than 3."]}},
        })
    );
}

#[test]
fn test_sibling_declarations_merge_per_element() {
    let rules = FieldRules::new()
        .field("addresses.*.street", "required|trim")
        .field("addresses.*.zip", "integer");
    let data = json!({
        "addresses": [
            {"street": " a st ", "zip": "1000", "extra": true},
            {"street": "b st", "zip": 2000},
        ],
    });
    let out = jrv::validate(&rules, &data, &ValidateOptions::default()).unwrap();
    assert!(out.success);
    assert_eq!(
        out.data,
        json!({
            "addresses": [
                {"street": "a st", "zip": 1000},
                {"street": "b st", "zip": 2000},
            ],
        })
    );
}

#[test]
fn test_scalar_source_is_wrapped() {
    let rules = FieldRules::new().field("tags.*", "string");
    let out = jrv::validate(&rules, &json!({"tags": "solo"}), &ValidateOptions::default()).unwrap();
    assert!(out.success);
    assert_eq!(out.data, json!({"tags": ["solo"]}));
}

#[test]
fn test_excluded_elements_are_dropped() {
    let rules = FieldRules::new().field("items.*.code", "exclude_if:kind,internal|string");
    let data = json!({
        "items": [
            {"code": "a", "kind": "public"},
            {"code": "b", "kind": "internal"},
            {"code": "c", "kind": "public"},
        ],
    });
    let out = jrv::validate(&rules, &data, &ValidateOptions::default()).unwrap();
    assert!(out.success);
    assert_eq!(out.data, json!({"items": [{"code": "a"}, {"code": "c"}]}));
}

#[test]
fn test_distinct_across_rows() {
    let rules = FieldRules::new().field("items.*.id", "distinct");
    let unique = json!({"items": [{"id": 1}, {"id": 2}]});
    assert!(jrv::validate(&rules, &unique, &ValidateOptions::default()).unwrap().success);

    let dupes = json!({"items": [{"id": 1}, {"id": 1}]});
    let out = jrv::validate(&rules, &dupes, &ValidateOptions::default()).unwrap();
    assert_eq!(out.violations.messages("items.0.id"), vec!["This value is not unique."]);
    assert_eq!(out.violations.messages("items.1.id"), vec!["This value is not unique."]);
}

#[test]
fn test_distinct_on_plain_list_elements() {
    let rules = FieldRules::new().field("tags.*", "distinct:true");
    let out = jrv::validate(&rules, &json!({"tags": ["a", "A"]}), &ValidateOptions::default()).unwrap();
    assert!(!out.success);
    let out = jrv::validate(&rules, &json!({"tags": ["a", "b"]}), &ValidateOptions::default()).unwrap();
    assert!(out.success);
}

#[test]
fn test_custom_message_applies_to_every_element() {
    let rules = FieldRules::new().field("tags.*", "integer");
    let options = ValidateOptions::default().with_message("tags.*", "{path} is not a number");
    let out = jrv::validate(&rules, &json!({"tags": ["x", 1, "y"]}), &options).unwrap();
    assert_eq!(
        out.violations.into_value(),
        json!({"tags": {"0": ["tags.0 is not a number"], "2": ["tags.2 is not a number"]}})
    );
}

#[test]
fn test_skipped_rows_keep_later_declarations_aligned() {
    let rules = FieldRules::new()
        .field("items.*.name", "required")
        .field("items.*.note", "optional|string");
    let data = json!({
        "items": [
            {"name": "a", "note": "x"},
            {"name": "b"},
            {"name": "c", "note": "y"},
        ],
    });
    let out = jrv::validate(&rules, &data, &ValidateOptions::default()).unwrap();
    assert!(out.success);
    assert_eq!(
        out.data,
        json!({
            "items": [
                {"name": "a", "note": "x"},
                {"name": "b"},
                {"name": "c", "note": "y"},
            ],
        })
    );
}

#[test]
fn test_list_and_element_violations_are_both_kept() {
    let rules = FieldRules::new()
        .field("tags", "required")
        .field("tags.*", "string");
    let out = jrv::validate(&rules, &json!({}), &ValidateOptions::default()).unwrap();
    assert_eq!(
        out.violations.clone().into_value(),
        json!({
            "tags": {
                "_messages": ["This value should not be blank."],
                "0": ["This value should be a string."],
            },
        })
    );
    assert_eq!(out.violations.messages("tags"), vec!["This value should not be blank."]);
    assert_eq!(out.violations.messages("tags.0"), vec!["This value should be a string."]);
}
