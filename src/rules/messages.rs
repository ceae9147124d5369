//! Default violation messages and `{placeholder}` rendering.

use crate::comparison::stringify;
use crate::context::Context;
use crate::expression::Arg;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Fallback when neither a custom nor a rule message exists.
pub const MESSAGE_DEFAULT: &str = "This value is not valid.";

pub const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("accepted", "This value should be accepted."),
    ("after", "This value should be after {argument_0}."),
    ("after_or_equal", "This value should be after or equal to {argument_0}."),
    ("alpha", "This value should be alpha characters."),
    ("alnum", "This value should be alpha or numeric characters."),
    ("array", "This value should be an array."),
    ("before", "This value should be before {argument_0}."),
    ("before_or_equal", "This should be before or equal to {argument_0}."),
    ("between", "This value should between {argument_0} and {argument_1}."),
    ("boolean", "This value should be boolean."),
    ("confirmed", "This value should be confirmed."),
    ("date", "This value should be a valid date."),
    ("date_equals", "This value should be equal to date {argument_0}."),
    ("date_format", "This value is not valid date format."),
    ("different", "This value should be different with {argument_0}."),
    ("digits", "This value should be digits characters."),
    ("digits_between", "This value should between {argument_0} and {argument_1} in length."),
    ("distinct", "This value is not unique."),
    ("email", "This value is not a valid email."),
    ("ends_with", "This value should ends with {arguments}."),
    ("gt", "This value should greater than {argument_0}."),
    ("gte", "This value should greater than or equals {argument_0}."),
    ("in", "This value is not an option."),
    ("in_array", "This value should be in {argument_0}."),
    ("integer", "This value should be an integer."),
    ("ip", "This value should be a valid IP address."),
    ("ip4", "This value should be a valid IP4 address."),
    ("ip6", "This value should be a valid IP6 address."),
    ("json", "This value should be a valid json."),
    ("lt", "This value should be less than {argument_0}."),
    ("lte", "This value should be less than or equals {argument_0}."),
    ("match", "This value should match with expected pattern."),
    ("max", "This value should not greater than {argument_0}."),
    ("max_length", "This value should not be longer than {argument_0} characters."),
    ("min", "This value should not less than {argument_0}."),
    ("min_length", "This value should not be shorter than {argument_0} characters."),
    ("not_in", "This value is not an option."),
    ("not_match", "This value should not match with the given pattern."),
    ("numeric", "This value should be numeric."),
    ("required", "This value should not be blank."),
    ("required_if", "This value should not be blank."),
    ("required_unless", "This value should not be blank."),
    ("same", "This value should same with {argument_0}."),
    ("size", "This value should be {argument_0} in size."),
    ("starts_with", "This value should starts with {arguments}."),
    ("string", "This value should be a string."),
    ("url", "This value should be an URL."),
];

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([a-z_0-9]+)\}").unwrap());

/// Substitute `{value}`, `{arguments}`, `{argument_N}`, `{field}`, `{path}`,
/// `{prefix}`, `{suffix}` and `{position}`. Unknown placeholders stay as written.
pub fn render(template: &str, args: &[Arg], ctx: &Context<'_>) -> String {
    if !template.contains('{') {
        return template.to_string();
    }
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match name {
                "value" => stringify(ctx.value()),
                "arguments" => format!("[{}]", args.iter().join(", ")),
                "field" => ctx.field().to_string(),
                "path" => ctx.path(),
                "prefix" => ctx.prefix().unwrap_or_default().to_string(),
                "suffix" => ctx.suffix().unwrap_or_default().to_string(),
                "position" => ctx.position().map(|p| p.to_string()).unwrap_or_default(),
                other => other
                    .strip_prefix("argument_")
                    .and_then(|n| n.parse::<usize>().ok())
                    .and_then(|n| args.get(n))
                    .map(|arg| arg.to_string())
                    .unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Scope;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn renders_placeholders() {
        let scope = Scope {
            prefix: Some("items".into()),
            position: Some(2),
            ..Scope::default()
        };
        let ctx = Context::new("name", json!("bar"), None, None, scope);
        let args = [Arg::from("foo"), Arg::Int(3)];
        assert_eq!(
            render("\"{value}\" at {path} ({field}/{prefix}/{position}) {arguments} {argument_1} {unknown}", &args, &ctx),
            "\"bar\" at items.2.name (name/items/2) [foo, 3] 3 {unknown}"
        );
        assert_eq!(render("no placeholders", &args, &ctx), "no placeholders");
        assert_eq!(render("{argument_5}", &args, &ctx), "{argument_5}");
    }
}
