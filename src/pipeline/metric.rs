//! Per-file metric computation.
//!
//! `Metric` is the extension seam: the pool runs every configured metric
//! against each dequeued file. Line count is the only built-in metric.

use crate::core::MetricValue;
use std::io::{BufRead, BufReader, Read};

/// Wire name of the line count metric in the published report.
pub const NUMBER_OF_ROWS: &str = "number_of_rows";

pub trait Metric: Send + Sync {
    /// Metric name as it appears in the report.
    fn name(&self) -> &str;

    /// Computes the value from the file contents. An error means the
    /// metric is omitted for that file; it never stops the pipeline.
    fn compute(&self, input: &mut dyn Read) -> std::io::Result<MetricValue>;
}

/// Counts lines the way a buffered line reader does: a final line without
/// a terminator still counts as a line, and an empty file counts zero.
pub struct LineCount;

impl Metric for LineCount {
    fn name(&self) -> &str {
        NUMBER_OF_ROWS
    }

    fn compute(&self, input: &mut dyn Read) -> std::io::Result<MetricValue> {
        let reader = BufReader::new(input);
        let mut rows: u64 = 0;
        for line in reader.lines() {
            line?;
            rows += 1;
        }
        Ok(MetricValue::Count(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn count(text: &str) -> MetricValue {
        LineCount
            .compute(&mut Cursor::new(text.as_bytes()))
            .unwrap()
    }

    #[test]
    fn empty_file_counts_zero() {
        assert_eq!(count(""), MetricValue::Count(0));
    }

    #[test]
    fn terminated_lines_count_exactly() {
        assert_eq!(count("a\nb\nc\n"), MetricValue::Count(3));
    }

    #[test]
    fn trailing_unterminated_line_counts() {
        assert_eq!(count("a\nb\nc"), MetricValue::Count(3));
    }

    #[test]
    fn lone_newline_is_one_row() {
        assert_eq!(count("\n"), MetricValue::Count(1));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut input = Cursor::new(vec![0xff, 0xfe, b'\n']);
        assert!(LineCount.compute(&mut input).is_err());
    }
}
