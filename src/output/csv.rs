use super::{Formatter, iso8601_timestamp};
use crate::pipeline::FilteredSample;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, sample: &FilteredSample) -> String {
        format!(
            "{},{},{},{:.4}",
            iso8601_timestamp(),
            sample.seq,
            sample.raw,
            sample.filtered
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,seq,raw,filtered")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_shape() {
        let sample = FilteredSample {
            seq: 3,
            raw: 100,
            filtered: 99.25,
        };
        let line = CsvFormatter.format(&sample);
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[1], "3");
        assert_eq!(fields[2], "100");
        assert_eq!(fields[3], "99.2500");
        assert_eq!(CsvFormatter.header(), Some("ts,seq,raw,filtered"));
    }
}
