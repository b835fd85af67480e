//! Header cleaning.
//!
//! Trait databases ship headers like `5-1_AdultBodyMass_g` or `MSW05_Binomial`: a database
//! prefix, a numeric field code, a unit suffix, and a CamelCase body. [`clean_name`] turns
//! those into plain snake_case column names (`adult_body_mass`, `binomial`) before the header
//! is matched against a schema.

use std::sync::LazyLock;

use regex::Regex;

static NUMERIC_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-\d+_").expect("valid numeric code regex"));

static UNIT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<body>.*[A-Z].*)_[a-z][a-z0-9]*$").expect("valid unit suffix regex"));

/// Which cleaning steps [`clean_name`] applies, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRules {
    /// Database prefixes removed from the start of a name (first match wins).
    pub strip_prefixes: Vec<String>,
    /// Remove a leading `<n>-<n>_` field code.
    pub strip_numeric_code: bool,
    /// Remove a trailing lower-case unit (`_g`, `_mm`, `_km2`) after a mixed-case body.
    pub strip_unit_suffix: bool,
    /// Convert the result to lower snake_case.
    pub snake_case: bool,
}

impl Default for NameRules {
    /// PanTHERIA conventions.
    fn default() -> Self {
        Self {
            strip_prefixes: vec!["MSW05_".to_string()],
            strip_numeric_code: true,
            strip_unit_suffix: true,
            snake_case: true,
        }
    }
}

impl NameRules {
    /// Keep headers exactly as written (apart from surrounding whitespace).
    pub fn verbatim() -> Self {
        Self {
            strip_prefixes: Vec::new(),
            strip_numeric_code: false,
            strip_unit_suffix: false,
            snake_case: false,
        }
    }
}

/// Clean one header name.
pub fn clean_name(raw: &str, rules: &NameRules) -> String {
    let mut name = raw.trim();

    if let Some(rest) = rules
        .strip_prefixes
        .iter()
        .find_map(|p| name.strip_prefix(p.as_str()))
    {
        name = rest;
    }

    if rules.strip_numeric_code {
        if let Some(m) = NUMERIC_CODE.find(name) {
            name = &name[m.end()..];
        }
    }

    if rules.strip_unit_suffix {
        if let Some(body) = UNIT_SUFFIX.captures(name).and_then(|c| c.name("body")) {
            name = body.as_str();
        }
    }

    if rules.snake_case {
        to_snake_case(name)
    } else {
        name.to_string()
    }
}

/// Clean a whole header row. Empty results become `column_<n>` and collisions get `_2`, `_3`, ...
pub fn clean_names<'a>(raw: impl IntoIterator<Item = &'a str>, rules: &NameRules) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (i, header) in raw.into_iter().enumerate() {
        let mut name = clean_name(header, rules);
        if name.is_empty() {
            name = format!("column_{}", i + 1);
        }
        if out.contains(&name) {
            let mut n = 2;
            while out.contains(&format!("{name}_{n}")) {
                n += 1;
            }
            name = format!("{name}_{n}");
        }
        out.push(name);
    }
    out
}

/// `AdultHeadBodyLen` → `adult_head_body_len`; acronyms stay together (`GR_Area` → `gr_area`);
/// any non-alphanumeric character becomes a single separator.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out.split('_').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("_")
}
