use super::Formatter;
use crate::pipeline::FilteredSample;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, sample: &FilteredSample) -> String {
        if self.verbose {
            format!(
                "Sample #{:>8}: filtered {:>9.2} (raw {:>5}, delta {:>+8.2})",
                sample.seq,
                sample.filtered,
                sample.raw,
                sample.filtered - sample.raw as f32
            )
        } else {
            format!(
                "Sample #{:>8}: filtered {:>9.2} (raw {:>5})",
                sample.seq, sample.filtered, sample.raw
            )
        }
    }
}
