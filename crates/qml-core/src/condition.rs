//! Readable rendering of the questionnaire expression language.
//!
//! This is a fixed pipeline of textual rewrites, not a parser. Anything the
//! rewrites do not recognize is passed through unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Marker used for a missing answer in translated conditions.
pub const MISSING: &str = "MISS";

/// Tokens removed from translated conditions.
const NOISE_TOKENS: &[&str] = &["PRELOAD", ".valueId", "zofar."];

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static AS_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"zofar\.asNumber\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)").expect("Invalid asNumber regex")
});

static NUMBER_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+(?:\.\d+)?)\s*==\s*([A-Za-z_][A-Za-z0-9_]*(?:\.valueId|\.value)?)\b")
        .expect("Invalid comparison regex")
});

static EQUALS_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*==\s*(\d)").expect("Invalid equality regex"));

static NOT_MISSING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\s*zofar\.isMissing\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)")
        .expect("Invalid isMissing regex")
});

static IS_MISSING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"zofar\.isMissing\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)")
        .expect("Invalid isMissing regex")
});

static VALUE_ACCESSOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!\s*)?\b([A-Za-z_][A-Za-z0-9_]*)\.value\b(\s*(?:==|!=|<=|>=|<|>))?")
        .expect("Invalid value accessor regex")
});

static AND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*&&\s*|\s+(?i:and)\s+").expect("Invalid and regex"));

static OR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|\|\s*|\s+(?i:or)\s+").expect("Invalid or regex"));

static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("Invalid spaces regex"));

/// Translate a raw condition into a readable boolean expression.
///
/// An absent condition reads as `true`.
pub fn translate(condition: Option<&str>) -> String {
    let Some(raw) = condition else {
        return "true".to_string();
    };
    let mut text = WHITESPACE.replace_all(raw, " ").trim().to_string();
    if text.is_empty() {
        return "true".to_string();
    }
    text = AS_NUMBER.replace_all(&text, "$1").into_owned();
    text = NUMBER_FIRST.replace_all(&text, "$2 == $1").into_owned();
    text = EQUALS_DIGIT.replace_all(&text, " == $1").into_owned();
    text = NOT_MISSING
        .replace_all(&text, format!("$1 != {MISSING}"))
        .into_owned();
    text = IS_MISSING
        .replace_all(&text, format!("$1 == {MISSING}"))
        .into_owned();
    text = VALUE_ACCESSOR
        .replace_all(&text, rewrite_value_accessor)
        .into_owned();
    text = AND.replace_all(&text, " &\n").into_owned();
    text = OR.replace_all(&text, " |\n").into_owned();
    for token in NOISE_TOKENS {
        text = text.replace(token, "");
    }
    tidy(&text)
}

/// `x.value` on its own is a boolean check; followed by a comparison it is
/// just the variable's value.
fn rewrite_value_accessor(caps: &Captures<'_>) -> String {
    let name = &caps[2];
    match (caps.get(1), caps.get(3)) {
        (negation, Some(comparison)) => format!(
            "{}{}{}",
            negation.map_or("", |m| m.as_str()),
            name,
            comparison.as_str()
        ),
        (Some(_), None) => format!("{name} != 1"),
        (None, None) => format!("{name} == 1"),
    }
}

fn tidy(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| SPACES.replace_all(line.trim(), " ").into_owned())
        .collect();
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_blank_is_true() {
        assert_eq!(translate(None), "true");
        assert_eq!(translate(Some("  \n ")), "true");
    }

    #[test]
    fn missing_predicates() {
        assert_eq!(translate(Some("zofar.isMissing(v1)")), "v1 == MISS");
        assert_eq!(translate(Some("!zofar.isMissing(v1)")), "v1 != MISS");
        assert_eq!(translate(Some("! zofar.isMissing( v1 )")), "v1 != MISS");
    }

    #[test]
    fn number_cast_is_unwrapped() {
        assert_eq!(translate(Some("zofar.asNumber(age)==3")), "age == 3");
        assert_eq!(translate(Some("3 == zofar.asNumber(age)")), "age == 3");
    }

    #[test]
    fn number_first_comparison_keeps_accessor_on_variable() {
        assert_eq!(translate(Some("1 == ab01.value")), "ab01 == 1");
        assert_eq!(translate(Some("1 == pid.valueId")), "pid == 1");
        assert_eq!(
            translate(Some("2 == x.value or zofar.isMissing(y)")),
            "x == 2 |\ny == MISS"
        );
    }

    #[test]
    fn boolean_accessor_depends_on_negation() {
        assert_eq!(translate(Some("ab01.value")), "ab01 == 1");
        assert_eq!(translate(Some("!ab01.value")), "ab01 != 1");
        assert_eq!(translate(Some("num.value > 18")), "num > 18");
    }

    #[test]
    fn logical_keywords_break_lines() {
        assert_eq!(
            translate(Some("a.value and !b.value or zofar.isMissing(c)")),
            "a == 1 &\nb != 1 |\nc == MISS"
        );
        assert_eq!(translate(Some("a.value&&b.value")), "a == 1 &\nb == 1");
    }

    #[test]
    fn noise_tokens_are_stripped() {
        assert_eq!(
            translate(Some("PRELOADpid.valueId == 'ao1'")),
            "pid == 'ao1'"
        );
    }

    #[test]
    fn unknown_syntax_passes_through() {
        assert_eq!(translate(Some("foo(bar) ~ baz")), "foo(bar) ~ baz");
        assert_eq!(translate(Some("((")), "((");
    }
}
