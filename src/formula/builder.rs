//! Formula builder implementations

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// A bare function name immediately followed by a parenthesised argument list
static FORMULA_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*\(.*\)$").unwrap());

/// Whether `token` looks like a function call such as `NOW()`
pub fn is_formula_call(token: &str) -> bool {
    FORMULA_CALL.is_match(token)
}

/// Pass function calls through; quote anything else as a string literal
pub fn classify_value(token: &str) -> String {
    if is_formula_call(token) {
        return token.to_string();
    }

    let escaped = token.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Pass function calls through; wrap anything else as a `{column}` reference
pub fn classify_column(token: &str) -> String {
    if is_formula_call(token) {
        token.to_string()
    } else {
        format!("{{{token}}}")
    }
}

/// A date bound rendered as formula text
///
/// Strings are kept as given (literal or function call); chrono values are
/// rendered as ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBound(String);

impl DateBound {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DateBound {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DateBound {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<NaiveDate> for DateBound {
    fn from(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }
}

impl From<NaiveDateTime> for DateBound {
    fn from(datetime: NaiveDateTime) -> Self {
        Self(datetime.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

impl From<DateTime<Utc>> for DateBound {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self(datetime.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

/// Build a filter matching `column` values within `[start, end]`, inclusive
///
/// `unit` is the granularity for `IS_SAME` (e.g. `day`, `month`). Bounds may
/// be strings or chrono values; empty bounds count as absent. Both bounds
/// share one type, so pass `None::<&str>` when neither is given.
pub fn date_range_filter<B>(
    column: Option<&str>,
    start: Option<B>,
    end: Option<B>,
    unit: &str,
) -> Result<String>
where
    B: Into<DateBound>,
{
    let column = match column {
        Some(c) if !c.is_empty() => classify_column(c),
        _ => return Err(Error::MissingColumn),
    };
    let unit = classify_value(unit);

    let start_clause = present(start).map(|s| {
        let value = classify_value(s.as_str());
        format!("OR(IS_AFTER({column}, {value}), IS_SAME({column}, {value}, {unit}))")
    });
    let end_clause = present(end).map(|e| {
        let value = classify_value(e.as_str());
        format!("OR(IS_BEFORE({column}, {value}), IS_SAME({column}, {value}, {unit}))")
    });

    match (start_clause, end_clause) {
        (Some(start), Some(end)) => Ok(format!("AND({start}, {end})")),
        (Some(clause), None) | (None, Some(clause)) => Ok(clause),
        (None, None) => Err(Error::MissingBound),
    }
}

fn present<B: Into<DateBound>>(bound: Option<B>) -> Option<DateBound> {
    bound.map(Into::into).filter(|b| !b.is_empty())
}

/// `AND(a, b, ...)`
pub fn all_of<I, S>(parts: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    combine("AND", parts)
}

/// `OR(a, b, ...)`
pub fn any_of<I, S>(parts: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    combine("OR", parts)
}

/// `NOT(expr)`
pub fn not(expression: &str) -> String {
    format!("NOT({expression})")
}

/// `{column} = 'value'`
pub fn field_equals(column: &str, value: &str) -> String {
    format!("{} = {}", classify_column(column), classify_value(value))
}

fn combine<I, S>(function: &str, parts: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = parts.into_iter().map(|p| p.as_ref().to_string()).collect();
    if parts.is_empty() {
        return Err(Error::formula(format!(
            "{function}() needs at least one expression"
        )));
    }
    Ok(format!("{function}({})", parts.join(", ")))
}
