//! Token resolution: fuzzy field-name matching and `{{token}}` substitution.
//!
//! Field lookup tries an ordered list of matcher strategies — exact,
//! case-insensitive, normalized, substring — and the first hit wins.
//! Substitution fails open: a token no strategy can resolve stays in the
//! output literally, with a diagnostic, so one bad column name never
//! aborts a scene.

use tracing::warn;

use crate::template::Record;

/// A single field-name matching strategy.
type Matcher = fn(&str, &str) -> bool;

/// Matching strategies in priority order. First match wins.
const MATCHERS: &[Matcher] = &[
    match_exact,
    match_case_insensitive,
    match_normalized,
    match_substring,
];

fn match_exact(key: &str, name: &str) -> bool {
    key == name
}

fn match_case_insensitive(key: &str, name: &str) -> bool {
    key.to_lowercase() == name.to_lowercase()
}

fn match_normalized(key: &str, name: &str) -> bool {
    normalize_field_name(key) == normalize_field_name(name)
}

/// Substring containment in either direction, on normalized forms.
fn match_substring(key: &str, name: &str) -> bool {
    let key = normalize_field_name(key);
    let name = normalize_field_name(name);
    !key.is_empty() && !name.is_empty() && (key.contains(&name) || name.contains(&key))
}

/// Collapse whitespace, underscores, and hyphens, and case-fold, so that
/// "Full Name", "full_name", and "FULL-NAME" all normalize identically.
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve a bound field name against a record.
///
/// Tries each strategy in [`MATCHERS`] over the whole record before moving
/// to the next, so a looser strategy can never shadow a stricter one.
/// Returns `None` (with a diagnostic) when nothing matches.
pub fn resolve_field<'a>(record: &'a Record, name: &str) -> Option<&'a str> {
    for matcher in MATCHERS {
        for (key, value) in record {
            if matcher(key, name) {
                return Some(value.as_str());
            }
        }
    }
    warn!(field = name, "no record field matches binding");
    None
}

/// Bound field names sometimes arrive in token form (`{{Name}}`); strip the
/// braces before matching.
pub fn binding_field_name(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("{{")
        .and_then(|s| s.strip_suffix("}}"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Substitute every `{{token}}` in `text` with its record value.
///
/// Unresolvable tokens are left literally in place. An unterminated `{{`
/// is treated as plain text.
pub fn substitute_tokens(text: &str, record: &Record) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let token = after[..end].trim();
                match resolve_field(record, token) {
                    Some(value) => out.push_str(value),
                    // Fail open: keep the literal token text
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
