use serde_json::json;

use super::{Formatter, iso8601_timestamp};
use crate::pipeline::FilteredSample;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, sample: &FilteredSample) -> String {
        json!({
            "ts": iso8601_timestamp(),
            "seq": sample.seq,
            "raw": sample.raw,
            "filtered": sample.filtered,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trips() {
        let sample = FilteredSample {
            seq: 11,
            raw: 512,
            filtered: 510.5,
        };
        let line = JsonFormatter.format(&sample);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["seq"], 11);
        assert_eq!(value["raw"], 512);
        assert!((value["filtered"].as_f64().unwrap() - 510.5).abs() < 1e-6);
        assert!(value["ts"].is_string());
    }
}
