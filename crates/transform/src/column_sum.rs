//! Column-wise summation of delimited integer rows

use crate::{Transform, TransformError};
use csv::{ReaderBuilder, Trim};

/// Sums delimited integer rows column by column.
///
/// Input is one vector per line, e.g. `1,2\n2,3\n1,3`; output is a single
/// line with the sum of each column, e.g. `4,8`, without a trailing newline.
///
/// - Lines may end in `\n`, `\r\n`, or `\r`; blank lines are skipped
/// - Whitespace around fields is ignored
/// - Quotes are not special, so a quoted field fails to parse
/// - Every row must have as many fields as the first one
/// - Sums are checked `i64` arithmetic
#[derive(Debug, Clone, Copy)]
pub struct ColumnSum {
    delimiter: u8,
}

impl Default for ColumnSum {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl ColumnSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field separator for both input and output (default `,`)
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse `input` and return the per-column sums.
    ///
    /// An input without any rows yields an empty vector.
    pub fn sum_columns(&self, input: &[u8]) -> Result<Vec<i64>, TransformError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(input);

        let mut sums: Option<Vec<i64>> = None;
        let mut rows = 0u64;

        for (index, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 1);

            if record.len() == 1 && record[0].is_empty() {
                continue;
            }

            let sums = sums.get_or_insert_with(|| vec![0; record.len()]);
            if record.len() != sums.len() {
                return Err(TransformError::ShapeMismatch {
                    line,
                    expected: sums.len(),
                    found: record.len(),
                });
            }

            for (column, (field, sum)) in record.iter().zip(sums.iter_mut()).enumerate() {
                let value: i64 = field.parse().map_err(|source| TransformError::ParseFailed {
                    line,
                    column: column + 1,
                    field: field.to_string(),
                    source,
                })?;
                *sum = sum
                    .checked_add(value)
                    .ok_or(TransformError::Overflow { column: column + 1 })?;
            }
            rows += 1;
        }

        let sums = sums.unwrap_or_default();
        tracing::debug!("Summed {} rows across {} columns", rows, sums.len());
        Ok(sums)
    }

    /// Join sums with the delimiter, in column order
    pub fn render(&self, sums: &[i64]) -> String {
        let separator = char::from(self.delimiter).to_string();
        sums.iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(&separator)
    }
}

impl Transform for ColumnSum {
    fn name(&self) -> &str {
        "column-sum"
    }

    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let sums = self.sum_columns(input)?;
        Ok(self.render(&sums).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(input: &str) -> Result<String, TransformError> {
        ColumnSum::new()
            .apply(input.as_bytes())
            .map(|out| String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_sums_columns() {
        assert_eq!(apply("1,2\n2,3\n1,3").unwrap(), "4,8");
    }

    #[test]
    fn test_single_row_is_its_own_sum() {
        assert_eq!(apply("5,7").unwrap(), "5,7");
    }

    #[test]
    fn test_single_column() {
        assert_eq!(apply("1\n2\n3").unwrap(), "6");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(apply("-1,10\n-2,-20\n3,5").unwrap(), "0,-5");
    }

    #[test]
    fn test_trailing_newline_and_blank_lines_are_skipped() {
        assert_eq!(apply("1,2\n\n2,3\n").unwrap(), "3,5");
    }

    #[test]
    fn test_crlf_and_whitespace() {
        assert_eq!(apply("1, 2\r\n 2 ,3\r\n").unwrap(), "3,5");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(apply("").unwrap(), "");
        assert!(ColumnSum::new().sum_columns(b"\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let transform = ColumnSum::new().with_delimiter(b';');
        let out = transform.apply(b"1;2\n3;4").unwrap();
        assert_eq!(out, b"4;6");
    }

    #[test]
    fn test_non_numeric_field() {
        let err = apply("1,2\n2,x\n1,3").unwrap_err();
        match err {
            TransformError::ParseFailed {
                line,
                column,
                field,
                ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(column, 2);
                assert_eq!(field, "x");
            }
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_quoted_field_not_numeric() {
        let err = apply("\"5\",7").unwrap_err();
        assert!(matches!(
            err,
            TransformError::ParseFailed { column: 1, .. }
        ));
    }

    #[test]
    fn test_delimiter_inside_quotes_still_splits() {
        let sums = ColumnSum::new().sum_columns(b"1,2,3\n\"4,5\",6");
        match sums.unwrap_err() {
            TransformError::ParseFailed { line, column, field, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 1);
                assert_eq!(field, "\"4");
            }
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_unequal_row_lengths_rejected() {
        let err = apply("1,2,3\n4,5").unwrap_err();
        match err {
            TransformError::ShapeMismatch {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_longer_row_rejected() {
        let err = apply("1,2\n4,5,6").unwrap_err();
        assert!(matches!(
            err,
            TransformError::ShapeMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_overflow() {
        let input = format!("{},1\n1,1", i64::MAX);
        let err = apply(&input).unwrap_err();
        assert!(matches!(err, TransformError::Overflow { column: 1 }));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = ColumnSum::new().apply(&[b'1', b',', 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, TransformError::Csv(_)));
    }

    #[test]
    fn test_render() {
        let transform = ColumnSum::new();
        assert_eq!(transform.render(&[4, 8]), "4,8");
        assert_eq!(transform.render(&[]), "");
    }
}
