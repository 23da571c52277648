use crate::error::LoadResult;
use crate::record::{change_string, Column, Record};

const BOM: char = '\u{feff}';

/// Options controlling how raw CSV text is split into records
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    pub delimiter: u8,
    /// Honor double-quoted fields. Off by default: fields are split on
    /// every delimiter, so an embedded comma starts a new field.
    pub quoting: bool,
    /// Placeholder written into `Industry` when the file has none
    pub no_data_label: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quoting: false,
            no_data_label: "No data".to_string(),
        }
    }
}

/// Parse screening CSV text into records.
///
/// The first line is the header. Every following non-blank line becomes a
/// record keyed by header name; short rows are padded with empty strings
/// and extra fields are dropped. Change columns are derived afterwards.
/// Header-only input gives an empty vector.
pub fn parse_csv(text: &str, options: &ParseOptions) -> LoadResult<Vec<Record>> {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .quoting(options.quoting)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = reader.records();

    let headers: Vec<String> = match rows.next() {
        Some(header) => header?.iter().map(|s| s.to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();

    for result in rows {
        let row = result?;

        // Whitespace-only line
        if row.len() == 1 && row[0].is_empty() {
            continue;
        }

        let mut record = Record::from_pairs(
            headers
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), row.get(i).unwrap_or("").to_string())),
        );
        derive_fields(&mut record, &options.no_data_label);
        records.push(record);
    }

    Ok(records)
}

/// Fill in the Industry placeholder and compute both change columns
pub fn derive_fields(record: &mut Record, no_data_label: &str) {
    if record.column(Column::Industry).is_empty() {
        record.set(Column::Industry.key(), no_data_label);
    }

    let rsi7_change = change_string(
        record.column(Column::Rsi7),
        record.column(Column::YesterdayRsi7),
    );
    let rsi14_change = change_string(
        record.column(Column::Rsi14),
        record.column(Column::YesterdayRsi14),
    );

    record.set(Column::Rsi7Change.key(), rsi7_change);
    record.set(Column::Rsi14Change.key(), rsi14_change);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Record> {
        parse_csv(text, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_two_rows_in_order() {
        let records = parse("A,B\n1,2\n3,4");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("A"), Some("1"));
        assert_eq!(records[0].get("B"), Some("2"));
        assert_eq!(records[1].get("A"), Some("3"));
        assert_eq!(records[1].get("B"), Some("4"));
    }

    #[test]
    fn test_short_row_padded() {
        let records = parse("Ticker,Name,RSI7\n005930");
        assert_eq!(records[0].get("Ticker"), Some("005930"));
        assert_eq!(records[0].get("Name"), Some(""));
        assert_eq!(records[0].get("RSI7"), Some(""));
    }

    #[test]
    fn test_long_row_truncated() {
        let records = parse("A,B\n1,2,3");
        assert_eq!(records[0].get("A"), Some("1"));
        assert_eq!(records[0].get("B"), Some("2"));
        assert_eq!(records[0].get("C"), None);
    }

    #[test]
    fn test_fields_and_headers_trimmed() {
        let records = parse(" Ticker , RSI7 \n 005930 ,  61.2 ");
        assert_eq!(records[0].get("Ticker"), Some("005930"));
        assert_eq!(records[0].get("RSI7"), Some("61.2"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let records = parse("Ticker\n\nA\n   \nB\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("Ticker"), Some("B"));
    }

    #[test]
    fn test_crlf_and_bom() {
        let records = parse("\u{feff}Ticker,RSI7\r\n005930,60\r\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Ticker"), Some("005930"));
        assert_eq!(records[0].get("RSI7"), Some("60"));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(parse("Ticker,Name,RSI7\n").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_change_derived() {
        let records = parse("Ticker,RSI7,Yesterday_RSI7,RSI14,Yesterday_RSI14\nA,60,55,40,42.5");
        assert_eq!(records[0].get("RSI7_Change"), Some("5"));
        assert_eq!(records[0].get("RSI14_Change"), Some("-2.5"));
    }

    #[test]
    fn test_change_defaults_to_zero() {
        let records = parse("Ticker,RSI7,RSI14,Yesterday_RSI14\nA,60,abc,50");
        assert_eq!(records[0].get("RSI7_Change"), Some("0"));
        assert_eq!(records[0].get("RSI14_Change"), Some("0"));
    }

    #[test]
    fn test_industry_placeholder() {
        let records = parse("Ticker,Industry\nA,\nB,Semiconductors");
        assert_eq!(records[0].get("Industry"), Some("No data"));
        assert_eq!(records[1].get("Industry"), Some("Semiconductors"));

        let records = parse("Ticker\nA");
        assert_eq!(records[0].get("Industry"), Some("No data"));
    }

    #[test]
    fn test_custom_placeholder_and_delimiter() {
        let options = ParseOptions {
            delimiter: b';',
            no_data_label: "정보 없음".to_string(),
            ..ParseOptions::default()
        };
        let records = parse_csv("Ticker;RSI7\nA;1,5", &options).unwrap();
        assert_eq!(records[0].get("RSI7"), Some("1,5"));
        assert_eq!(records[0].get("Industry"), Some("정보 없음"));
    }

    #[test]
    fn test_naive_split_breaks_quoted_comma() {
        let records = parse("Ticker,Industry,RSI7\nA,\"Autos, Parts\",60");
        assert_eq!(records[0].get("Industry"), Some("\"Autos"));
        assert_eq!(records[0].get("RSI7"), Some("Parts\""));
    }

    #[test]
    fn test_quoting_keeps_embedded_comma() {
        let options = ParseOptions {
            quoting: true,
            ..ParseOptions::default()
        };
        let text = "Ticker,Industry,RSI7\nA,\"Autos, Parts\",60";
        let records = parse_csv(text, &options).unwrap();
        assert_eq!(records[0].get("Industry"), Some("Autos, Parts"));
        assert_eq!(records[0].get("RSI7"), Some("60"));
    }
}
