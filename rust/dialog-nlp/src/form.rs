//! Word-form normalisation used by lexical features.

/// Simplified form of anything that looks like a hyperlink.
pub const HYPERLINK: &str = "#hlink#";

/// Collapses every run of digits to `0` and every hyperlink to
/// [`HYPERLINK`].
pub fn simplify(form: &str) -> String {
    let lower = form.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.") {
        return HYPERLINK.to_string();
    }

    let mut simplified = String::with_capacity(form.len());
    let mut in_digits = false;
    for c in form.chars() {
        if c.is_ascii_digit() {
            if !in_digits {
                simplified.push('0');
            }
            in_digits = true;
        } else {
            simplified.push(c);
            in_digits = false;
        }
    }
    simplified
}

/// Lower-cased [`simplify`].
pub fn simplify_lowercase(form: &str) -> String {
    simplify(form).to_lowercase()
}

/// Maps upper-case letters to `A`, lower-case to `a`, digits to `0` and
/// keeps everything else, collapsing repeats of the same class.
pub fn shape(form: &str) -> String {
    let mut shape = String::new();
    let mut last = None;
    for c in form.chars() {
        let class = if c.is_uppercase() {
            'A'
        } else if c.is_lowercase() {
            'a'
        } else if c.is_numeric() {
            '0'
        } else {
            c
        };
        if last != Some(class) {
            shape.push(class);
            last = Some(class);
        }
    }
    shape
}

/// The first `n` characters of the lower-cased simplified form, unless
/// they would cover the whole word.
pub fn prefix(form: &str, n: usize) -> Option<String> {
    let simplified = simplify_lowercase(form);
    (n < simplified.chars().count()).then(|| simplified.chars().take(n).collect())
}

/// The last `n` characters of the lower-cased simplified form, unless they
/// would cover the whole word.
pub fn suffix(form: &str, n: usize) -> Option<String> {
    let simplified = simplify_lowercase(form);
    let len = simplified.chars().count();
    (n < len).then(|| simplified.chars().skip(len - n).collect())
}

/// Orthographic properties of a form.
pub fn orthographic(form: &str, is_first: bool) -> Vec<&'static str> {
    let simplified = simplify(form);
    if simplified == HYPERLINK {
        return vec!["hyperlink"];
    }

    let chars: Vec<char> = simplified.chars().collect();
    let is_punct = |c: &char| c.is_ascii_punctuation();

    let all_upper = chars.iter().all(|c| c.is_uppercase());
    let all_lower = chars.iter().all(|c| c.is_lowercase());
    let all_digit = chars.iter().all(|c| c.is_numeric());
    let all_punct = chars.iter().all(is_punct);
    let all_digit_or_punct = chars.iter().all(|c| c.is_numeric() || is_punct(c));
    let no_lower = !chars.iter().any(|c| c.is_lowercase());
    let first_upper = chars.first().is_some_and(|c| c.is_uppercase());
    let inner_upper = chars.iter().skip(1).filter(|c| c.is_uppercase()).count();

    let mut features = Vec::new();
    if all_upper {
        features.push("all_upper");
    } else if all_lower {
        features.push("all_lower");
    } else if all_digit {
        features.push("all_digit");
    } else if all_punct {
        features.push("all_punct");
    } else if all_digit_or_punct {
        features.push("all_digit_or_punct");
    } else if no_lower {
        features.push("no_lower");
    }

    if !all_upper {
        if first_upper && !is_first {
            features.push("fst_upper");
        }
        match inner_upper {
            0 => {}
            1 => features.push("upper_1"),
            _ => features.push("upper_2"),
        }
    }

    if !all_digit && chars.iter().any(|c| c.is_numeric()) {
        features.push("has_digit");
    }
    if !all_punct {
        if chars.contains(&'.') {
            features.push("has_period");
        }
        if chars.contains(&'-') {
            features.push("has_hyphen");
        }
        if chars.iter().any(is_punct) {
            features.push("has_punct");
        }
    }
    features
}
