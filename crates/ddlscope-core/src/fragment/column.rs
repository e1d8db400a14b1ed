//! Column fragment helpers: inline markers and default values

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{split_identifier_list, IDENT, QUALIFIED_IDENT};
use crate::dialect::SqlDialect;
use crate::schema::ForeignKey;

static INLINE_PRIMARY_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\s*(?:\bCONSTRAINT\s+{IDENT}\s+)?\bPRIMARY\s+KEY\b"
    ))
    .expect("valid inline primary key pattern")
});

static INLINE_REFERENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\s*(?:\bCONSTRAINT\s+{IDENT}\s+)?\bREFERENCES\s+(?P<table>{qualified})\s*\((?P<columns>[^)]*)\)(?:\s+MATCH\s+(?:FULL|PARTIAL|SIMPLE))?(?:\s+ON\s+(?:DELETE|UPDATE)\s+(?:CASCADE|RESTRICT|NO\s+ACTION|SET\s+NULL|SET\s+DEFAULT))*",
        qualified = *QUALIFIED_IDENT
    ))
    .expect("valid inline references pattern")
});

static INLINE_NOT_NULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\bNOT\s+NULL\b").expect("valid not null pattern"));

static INLINE_NULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\bNULL\b").expect("valid null pattern"));

static TRAILING_CAST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"::\s*[\w\s."]+(?:\(\s*\d+(?:\s*,\s*\d+)?\s*\))?(?:\[\])*\s*$"#)
        .expect("valid cast pattern")
});

/// Modifiers found embedded in a column's type fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineMarkers {
    pub primary_key: bool,
    pub not_null: bool,
    pub references: Option<InlineReference>,
}

/// `REFERENCES table (col, ...)` written on the column itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineReference {
    pub table: String,
    pub columns: Vec<String>,
}

impl InlineMarkers {
    /// The foreign key an inline reference implies for `column`.
    ///
    /// Inline references are single-column, so the first referenced column
    /// is used.
    pub fn foreign_key(&self, column: &str, dialect: SqlDialect) -> Option<ForeignKey> {
        let reference = self.references.as_ref()?;
        let target = reference.columns.first()?;
        Some(ForeignKey::new(
            column,
            dialect.normalize_name(&reference.table),
            target.clone(),
        ))
    }

    fn merge(&mut self, other: InlineMarkers) {
        self.primary_key |= other.primary_key;
        self.not_null |= other.not_null;
        if self.references.is_none() {
            self.references = other.references;
        }
    }
}

/// Strip PRIMARY KEY, REFERENCES ... and NULL / NOT NULL markers out of a
/// type fragment, reporting which ones were present.
pub fn strip_inline_markers(fragment: &str) -> (String, InlineMarkers) {
    take_markers(fragment, true)
}

/// Strip inline markers from both the type and the default fragments of a
/// column, so a marker written after DEFAULT is still honoured.
pub fn strip_column_markers(
    declared_type: &str,
    default: Option<&str>,
) -> (String, Option<String>, InlineMarkers) {
    let (declared_type, mut markers) = take_markers(declared_type, true);
    // `DEFAULT NULL` is a value, so a bare NULL is only a marker in the type
    let default = default.map(|raw| {
        let (value, default_markers) = take_markers(raw, false);
        markers.merge(default_markers);
        value
    });
    (declared_type, default, markers)
}

fn take_markers(fragment: &str, strip_bare_null: bool) -> (String, InlineMarkers) {
    let mut markers = InlineMarkers::default();

    let reference = INLINE_REFERENCES
        .captures_iter(fragment)
        .find(|caps| caps.get(0).is_some_and(|m| is_top_level(fragment, m.start())));
    let text = match reference {
        Some(caps) => {
            let columns = split_identifier_list(&caps["columns"]);
            if !columns.is_empty() {
                markers.references = Some(InlineReference {
                    table: caps["table"].to_string(),
                    columns,
                });
            }
            let range = caps.get(0).map_or(0..0, |m| m.range());
            cut(fragment, &[range])
        }
        None => fragment.to_string(),
    };

    let primary_keys = top_level_ranges(&INLINE_PRIMARY_KEY, &text);
    markers.primary_key = !primary_keys.is_empty();
    let text = cut(&text, &primary_keys);

    let not_nulls = top_level_ranges(&INLINE_NOT_NULL, &text);
    markers.not_null = !not_nulls.is_empty();
    let mut text = cut(&text, &not_nulls);

    if strip_bare_null {
        let nulls = top_level_ranges(&INLINE_NULL, &text);
        text = cut(&text, &nulls);
    }

    (text.trim().to_string(), markers)
}

/// Whether `offset` lies outside quoted literals and parentheses, where a
/// keyword is a column marker rather than part of a value or expression
fn is_top_level(text: &str, offset: usize) -> bool {
    let mut in_literal = false;
    let mut depth = 0usize;
    for c in text[..offset].chars() {
        match c {
            '\'' => in_literal = !in_literal,
            '(' if !in_literal => depth += 1,
            ')' if !in_literal => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    !in_literal && depth == 0
}

fn top_level_ranges(pattern: &Regex, text: &str) -> Vec<Range<usize>> {
    pattern
        .find_iter(text)
        .map(|m| m.range())
        .filter(|range| is_top_level(text, range.start))
        .collect()
}

/// `text` with the given ascending, non-overlapping ranges removed
fn cut(text: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in ranges {
        out.push_str(&text[last..range.start]);
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Normalize a raw default value: drop trailing `::type` casts (when the
/// dialect has them), then one pair of enclosing quotes.
pub fn clean_default(raw: &str, strip_casts: bool) -> String {
    let mut value = raw.trim();
    if strip_casts {
        while let Some(cast) = TRAILING_CAST.find(value) {
            value = value[..cast.start()].trim_end();
        }
    }
    unquote_literal(value).to_string()
}

fn unquote_literal(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
