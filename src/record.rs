//! Stock records and the fixed set of columns the table knows about

use std::collections::HashMap;

/// The nine columns shown in the table, in header order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Ticker,
    Industry,
    Rsi7,
    Rsi14,
    YesterdayRsi7,
    YesterdayRsi14,
    Rsi7Change,
    Rsi14Change,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Name,
        Column::Ticker,
        Column::Industry,
        Column::Rsi7,
        Column::Rsi14,
        Column::YesterdayRsi7,
        Column::YesterdayRsi14,
        Column::Rsi7Change,
        Column::Rsi14Change,
    ];

    /// Look up a column by its header position
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Key used in the CSV header and in the record map
    pub fn key(self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Ticker => "Ticker",
            Column::Industry => "Industry",
            Column::Rsi7 => "RSI7",
            Column::Rsi14 => "RSI14",
            Column::YesterdayRsi7 => "Yesterday_RSI7",
            Column::YesterdayRsi14 => "Yesterday_RSI14",
            Column::Rsi7Change => "RSI7_Change",
            Column::Rsi14Change => "RSI14_Change",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Ticker => "Ticker",
            Column::Industry => "Industry",
            Column::Rsi7 => "RSI(7)",
            Column::Rsi14 => "RSI(14)",
            Column::YesterdayRsi7 => "RSI(7) prev",
            Column::YesterdayRsi14 => "RSI(14) prev",
            Column::Rsi7Change => "RSI(7) chg",
            Column::Rsi14Change => "RSI(14) chg",
        }
    }

    /// RSI values and their changes compare as numbers, everything else as text
    pub fn is_numeric(self) -> bool {
        !matches!(self, Column::Name | Column::Ticker | Column::Industry)
    }

    pub fn is_change(self) -> bool {
        matches!(self, Column::Rsi7Change | Column::Rsi14Change)
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(self)
    }

    pub fn prev(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(self)
    }
}

/// One row of the screening file: column name to raw string value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Build a record from (key, value) pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value for `key`, empty when absent
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn column(&self, col: Column) -> &str {
        self.value(col.key())
    }

    /// Numeric reading of a column, `None` when empty or not a number
    pub fn number(&self, col: Column) -> Option<f64> {
        parse_number(self.column(col))
    }
}

/// Read the leading decimal number of a string.
///
/// Mirrors a browser's `parseFloat`: leading whitespace is skipped, the
/// longest prefix of the form `[+-]digits[.digits][e[+-]digits]` (or
/// `Infinity`) is taken and the remainder ignored. Returns `None` when no
/// digits are found.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            end = j;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Difference `current - previous` as a decimal string, `"0"` when either
/// side is missing or not a number
pub fn change_string(current: &str, previous: &str) -> String {
    if current.is_empty() || previous.is_empty() {
        return "0".to_string();
    }
    match (parse_number(current), parse_number(previous)) {
        // Adding zero turns -0 into 0
        (Some(a), Some(b)) if (a - b).is_finite() => (a - b + 0.0).to_string(),
        _ => "0".to_string(),
    }
}

/// Format with exactly two decimals, rounding halfway cases away from zero
/// as a browser's `toFixed(2)` does. Negative zero prints as `0.00`.
pub fn format_fixed2(value: f64) -> String {
    let value = value + 0.0;

    // A double lies exactly halfway between two hundredths only when its
    // fraction is an odd number of eighths
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let hundredths = (value.abs() * 100.0).ceil().copysign(value);
        return format!("{:.2}", hundredths / 100.0);
    }

    format!("{:.2}", value)
}
