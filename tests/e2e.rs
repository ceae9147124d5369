#![recursion_limit = "256"]

use chrono::{Duration, Local};
use json_rule_validation as jrv;
use jrv::{Arg, FieldRules, Outcome, RuleChain, ValidateOptions, Validator};
use pretty_assertions::assert_eq;
use serde_json::json;

fn day(offset: i64) -> String {
    (Local::now().date_naive() + Duration::days(offset))
        .format("%Y-%m-%d")
        .to_string()
}

#[test]
fn test_every_builtin_on_valid_input() {
    let (today, yesterday, tomorrow, after_tomorrow) = (day(0), day(-1), day(1), day(2));
    let rules = FieldRules::new()
        .field("accepted", "accepted")
        .field("after", "after:today")
        .field("after2", "after:after")
        .field("after3", RuleChain::new().rule_with("after", [today.as_str()]))
        .field("after_or_equal", "after_or_equal:today")
        .field("alpha", "alpha")
        .field("alnum", "alnum")
        .field("array", "array")
        .field("before", "before:today")
        .field("before_or_equal", "before_or_equal:today")
        .field("between", "between:1,3")
        .field("between2", "between:1,3")
        .field("between3", "between:1,3")
        .field("boolean", "boolean")
        .field("confirmed", "confirmed")
        .field("confirmed2", "confirmed:accepted")
        .field("date", "date:false,Y-m-d")
        .field("date_equals", format!("date_equals:{today}"))
        .field("date_format", "date_format:Y-m-d")
        .field("different", "different:confirmed")
        .field("digits", "digits")
        .field("digits_between", "digits_between:1,3")
        .field("distinct", "distinct:true")
        .field("email", "email")
        .field("ends_with", "ends_with:foo,bar")
        .field("exclude", "exclude")
        .field("exclude_if", "exclude_if:email,email@example.com")
        .field(
            "exclude_if2",
            RuleChain::new().rule_with("exclude_if", [Arg::predicate(|_| true)]),
        )
        .field("exclude_unless", "exclude_unless:email,email@example.com")
        .field(
            "exclude_unless2",
            RuleChain::new().rule_with("exclude_unless", [Arg::predicate(|_| true)]),
        )
        .field(
            "exclude_unless3",
            RuleChain::new().rule_with("exclude_unless", [Arg::predicate(|_| false)]),
        )
        .field("gt", "gt:alpha")
        .field("gte", "gte:alpha")
        .field("in", "in:a,b,c")
        .field("in_array", "in_array:distinct")
        .field("integer", "integer")
        .field("ip", "ip")
        .field("ip4", "ip4")
        .field("ip6", "ip6")
        .field("json", "json:true,true")
        .field("lt", "lt:alpha")
        .field("lte", "lte:alpha")
        .field("match", "match:/^foo$/")
        .field("max", "max:1")
        .field("min", "min:1")
        .field("max_length", "max_length:1")
        .field("min_length", "min_length:1")
        .field("not_in", "not_in:a,b,c")
        .field("not_match", "not_match:/^foo$/")
        .field("numeric", "numeric")
        .field("optional", "optional")
        .field("required", "required")
        .field("required_if", "required_if:email,email@example.com")
        .field(
            "required_if2",
            RuleChain::new().rule_with("required_if", [Arg::predicate(|_| true)]),
        )
        .field("required_unless", "required_unless:email,email@example.com")
        .field(
            "required_unless2",
            RuleChain::new().rule_with("required_unless", [Arg::predicate(|_| true)]),
        )
        .field("same", "same:1,false")
        .field("size", "size:1")
        .field("starts_with", "starts_with:foo,bar")
        .field("string", "string")
        .field("trim", "trim")
        .field("url", "url");
    let data = json!({
        "accepted": "1",
        "after": tomorrow,
        "after2": after_tomorrow,
        "after3": tomorrow,
        "after_or_equal": tomorrow,
        "alpha": "alpha",
        "alnum": "alnum1",
        "array": [],
        "before": yesterday,
        "before_or_equal": yesterday,
        "between": [1],
        "between2": "ab",
        "between3": 123,
        "boolean": "true",
        "confirmed": "true",
        "confirmed_confirmation": "true",
        "confirmed2": "1",
        "date": today,
        "date_equals": today,
        "date_format": today,
        "different": "false",
        "digits": "10",
        "digits_between": "10",
        "distinct": ["A", "b", "C"],
        "email": "email@example.com",
        "ends_with": "foobar",
        "exclude": "email@example.com",
        "exclude_if": "email@example.com",
        "exclude_if2": "email@example.com",
        "exclude_unless": "email@example.com",
        "exclude_unless2": "email@example.com",
        "gt": "alpha1",
        "gte": "alpha",
        "in": "a",
        "in_array": "A",
        "integer": "11",
        "ip": "189.43.5.56",
        "ip4": "189.43.5.56",
        "ip6": "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
        "json": "{\"foo\":\"bar\"}",
        "lt": "alph",
        "lte": "alpha",
        "match": "foo",
        "max": "a",
        "min": "ab",
        "max_length": "a",
        "min_length": "ab",
        "not_in": "d",
        "not_match": "bar",
        "numeric": "123.45",
        "required": "foo",
        "required_if": "foo",
        "required_if2": "foo",
        "required_unless": "foo",
        "required_unless2": "foo",
        "same": "1",
        "size": "1",
        "starts_with": "foobar",
        "string": "string",
        "trim": " foo ",
        "url": "http://example.com",
    });
    let expected = json!({
        "accepted": "1",
        "after": tomorrow,
        "after2": after_tomorrow,
        "after3": tomorrow,
        "after_or_equal": tomorrow,
        "alpha": "alpha",
        "alnum": "alnum1",
        "array": [],
        "before": yesterday,
        "before_or_equal": yesterday,
        "between": [1],
        "between2": "ab",
        "between3": 123,
        "boolean": true,
        "confirmed": "true",
        "confirmed2": "1",
        "date": today,
        "date_equals": today,
        "date_format": today,
        "different": "false",
        "digits": "10",
        "digits_between": "10",
        "distinct": ["A", "b", "C"],
        "email": "email@example.com",
        "ends_with": "foobar",
        "exclude_unless": "email@example.com",
        "exclude_unless2": "email@example.com",
        "gt": "alpha1",
        "gte": "alpha",
        "in": "a",
        "in_array": "A",
        "integer": 11,
        "ip": "189.43.5.56",
        "ip4": "189.43.5.56",
        "ip6": "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
        "json": {"foo": "bar"},
        "lt": "alph",
        "lte": "alpha",
        "match": "foo",
        "max": "a",
        "min": "ab",
        "max_length": "a",
        "min_length": "ab",
        "not_in": "d",
        "not_match": "bar",
        "numeric": 123.45,
        "required": "foo",
        "required_if": "foo",
        "required_if2": "foo",
        "required_unless": "foo",
        "required_unless2": "foo",
        "same": "1",
        "size": "1",
        "starts_with": "foobar",
        "string": "string",
        "trim": "foo",
        "url": "http://example.com",
    });

    let out = jrv::validate(&rules, &data, &ValidateOptions::default()).unwrap();
    assert_eq!(out.violations.into_value(), json!({}));
    assert!(out.success);
    assert_eq!(out.data, expected);
}

fn failing_setup() -> (Validator, FieldRules, serde_json::Value) {
    let mut validator = Validator::new();
    validator.register_rule("foo", |_, _| Ok(Outcome::Fail), Some("\"{value}\" is not an option."));
    let rules = FieldRules::new()
        .field("required", "required")
        .field("starts_with", "starts_with:foo,bar")
        .field("ends_with", "ends_with:foo,bar")
        .field("before", format!("before:{}", day(0)))
        .field("foo", "foo");
    let data = json!({
        "in": "d",
        "starts_with": "bazqux",
        "ends_with": "bazqux",
        "before": day(1),
        "foo": "bar",
    });
    (validator, rules, data)
}

#[test]
fn test_violation_messages() {
    let (validator, rules, data) = failing_setup();
    let out = validator
        .validate(&rules, &data, &ValidateOptions::default())
        .unwrap();
    assert!(!out.success);
    assert_eq!(
        out.violations.into_value(),
        json!({
            "required": ["This value should not be blank."],
            "starts_with": ["This value should starts with [foo, bar]."],
            "ends_with": ["This value should ends with [foo, bar]."],
            "before": [format!("This value should be before {}.", day(0))],
            "foo": ["\"bar\" is not an option."],
        })
    );
}

#[test]
fn test_skip_on_error_keeps_first_failure_only() {
    let (validator, rules, data) = failing_setup();
    let options = ValidateOptions::default().skip_on_error(true);
    let out = validator.validate(&rules, &data, &options).unwrap();
    assert_eq!(
        out.violations.into_value(),
        json!({"required": ["This value should not be blank."]})
    );
    assert_eq!(out.data, json!({}));
}

#[test]
fn test_custom_message_per_field() {
    let rules = FieldRules::new().field("name", "required|min:3");
    let options = ValidateOptions::default().with_message("name", "{field} needs {argument_0}+ chars, got \"{value}\".");
    let out = jrv::validate(&rules, &json!({"name": "ab"}), &options).unwrap();
    assert_eq!(out.violations.messages("name"), vec!["name needs 3+ chars, got \"ab\"."]);
}

#[test]
fn test_rule_supplied_message_wins() {
    let mut validator = Validator::new();
    validator.register_rule(
        "odd",
        |ctx, _| {
            let odd = ctx.value().as_i64().is_some_and(|n| n % 2 == 1);
            if !odd {
                let message = format!("{} is even", ctx.value());
                ctx.set_message(Some(message));
            }
            Ok(odd.into())
        },
        Some("default"),
    );
    let rules = FieldRules::new().field("n", "odd");
    let options = ValidateOptions::default().with_message("n", "custom");
    let out = validator.validate(&rules, &json!({"n": 4}), &options).unwrap();
    assert_eq!(out.violations.messages("n"), vec!["4 is even"]);
}

#[test]
fn test_short_circuit_reports_first_failure() {
    let rules = FieldRules::new().field("name", "required|min:3");
    let out = jrv::validate(&rules, &json!({"name": ""}), &ValidateOptions::default()).unwrap();
    assert_eq!(out.violations.messages("name"), vec!["This value should not be blank."]);
}

#[test]
fn test_confirmed_cross_field() {
    let rules = FieldRules::new().field("confirmed", "confirmed");
    let ok = json!({"confirmed": "true", "confirmed_confirmation": "true"});
    assert!(jrv::validate(&rules, &ok, &ValidateOptions::default()).unwrap().success);

    for bad in [json!({"confirmed": "true"}), json!({"confirmed": "true", "confirmed_confirmation": "false"})] {
        let out = jrv::validate(&rules, &bad, &ValidateOptions::default()).unwrap();
        assert_eq!(out.violations.messages("confirmed"), vec!["This value should be confirmed."]);
    }
}

#[test]
fn test_exclusion_removes_field() {
    let rules = FieldRules::new().field("a", "exclude");
    for value in [json!("x"), json!(null), json!([1, 2]), json!({"b": 1})] {
        let out = jrv::validate(&rules, &json!({"a": value}), &ValidateOptions::default()).unwrap();
        assert!(out.success);
        assert_eq!(out.data, json!({}));
        assert!(out.violations.is_empty());
    }
}

#[test]
fn test_optional_absent_field_is_omitted() {
    let rules = FieldRules::new().field("nick", "optional|min:3");
    let out = jrv::validate(&rules, &json!({}), &ValidateOptions::default()).unwrap();
    assert!(out.success);
    assert_eq!(out.data, json!({}));
}

#[test]
fn test_rules_from_json_declarations() {
    let rules = FieldRules::from_value(&json!({
        "age": "integer|min:18",
        "role": {"in": ["admin", "user"]},
        "since": {"date": [true, "d/m/Y", "UTC"]},
    }))
    .unwrap();
    let out = jrv::validate(
        &rules,
        &json!({"age": "21", "role": "user", "since": "18/10/2026"}),
        &ValidateOptions::default(),
    )
    .unwrap();
    assert!(out.success);
    assert_eq!(
        out.data,
        json!({"age": 21, "role": "user", "since": "2026-10-18T00:00:00+00:00"})
    );
}

#[test]
fn test_options_deserialize_from_camel_case() {
    let options: ValidateOptions =
        serde_json::from_value(json!({"skipOnError": true, "messages": {"a": "b"}})).unwrap();
    assert!(options.skip_on_error);
    assert_eq!(options.messages.get("a").map(String::as_str), Some("b"));
}

#[test]
fn test_validation_serializes_as_record() {
    let rules = FieldRules::new().field("a", "required");
    let out = jrv::validate(&rules, &json!({}), &ValidateOptions::default()).unwrap();
    assert_eq!(
        serde_json::to_value(&out).unwrap(),
        json!({"success": false, "data": {}, "violations": {"a": ["This value should not be blank."]}})
    );
}

#[test]
fn test_named_timezones() {
    let rules = FieldRules::from_value(&json!({
        "since": {"date": [true, "Y-m-d H:i", "Asia/Jakarta"]},
        "until": {"after": ["2026-10-18", "Y-m-d", "Europe/Paris"]},
    }))
    .unwrap();
    let out = jrv::validate(
        &rules,
        &json!({"since": "2026-10-18 08:00", "until": "2026-10-19"}),
        &ValidateOptions::default(),
    )
    .unwrap();
    assert!(out.success, "{:?}", out.violations);
    assert_eq!(out.data["since"], json!("2026-10-18T08:00:00+07:00"));
}
