use regex::{Regex, RegexBuilder};

use crate::core::{Result, RootPlanError};

/// Compile `pattern` with the caller's flag letters.
///
/// `g` and `u` are accepted and have no effect: every match is always
/// replaced and matching is always Unicode-aware.
pub fn compile_pattern(pattern: &str, flags: Option<&str>) -> Result<Regex> {
    let mut builder = RegexBuilder::new(pattern);

    for flag in flags.unwrap_or_default().chars() {
        match flag {
            'g' | 'u' => {}
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            other => {
                return Err(RootPlanError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: format!("unsupported flag '{}'", other),
                });
            }
        }
    }

    builder.build().map_err(|e| RootPlanError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Translate a `$1` / `$<name>` / `$&` / `$$` replacement template into the
/// `regex` crate's expansion syntax.
///
/// References to groups the pattern does not define are kept as literal text.
pub fn translate_template(template: &str, regex: &Regex) -> String {
    let group_count = regex.captures_len();
    let names: Vec<&str> = regex.capture_names().flatten().collect();

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push_str("$$");
            rest = tail;
            continue;
        }

        if let Some(tail) = after.strip_prefix('&') {
            out.push_str("${0}");
            rest = tail;
            continue;
        }

        if let Some(tail) = after.strip_prefix('<') {
            if let Some(end) = tail.find('>') {
                let name = &tail[..end];
                if names.contains(&name) {
                    out.push_str("${");
                    out.push_str(name);
                    out.push('}');
                    rest = &tail[end + 1..];
                    continue;
                }
            }
            out.push_str("$$");
            rest = after;
            continue;
        }

        let digits: String = after.chars().take(2).take_while(|c| c.is_ascii_digit()).collect();
        if let Some((index, used)) = group_reference(&digits, group_count) {
            out.push_str(&format!("${{{}}}", index));
            rest = &after[used..];
            continue;
        }

        out.push_str("$$");
        rest = after;
    }

    out.push_str(rest);
    out
}

/// Longest valid 1-based group reference in `digits`, preferring two digits.
fn group_reference(digits: &str, group_count: usize) -> Option<(usize, usize)> {
    if digits.len() == 2 {
        if let Ok(n) = digits.parse::<usize>() {
            if n >= 1 && n < group_count {
                return Some((n, 2));
            }
        }
    }

    let first = digits.get(..1)?;
    let n = first.parse::<usize>().ok()?;
    (n >= 1 && n < group_count).then_some((n, 1))
}
