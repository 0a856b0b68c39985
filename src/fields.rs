//! FieldView: canonical text projections of a record
//!
//! Derives the three views every detector works against:
//! - `text`       problem statement only
//! - `code`       resolved solution program
//! - `everything` text + code concatenated
//!
//! Code resolution prefers the record's direct `code` field; when that is
//! absent, the 1-based `pass_at_k` index selects the successful attempt.
//! Index 0 or out-of-range resolves to an empty program. Never fails.

use crate::record::Record;

/// Named text projections for one record.
#[derive(Debug, Clone, Default)]
pub struct FieldView {
    pub text: String,
    pub code: String,
    pub everything: String,
}

/// Which projection a scoring rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Text,
    Code,
    All,
}

impl FieldView {
    /// Project a record into its field views.
    pub fn project(record: &Record) -> Self {
        let text = record.problem_text.clone();

        let code = match &record.code {
            Some(c) => c.clone(),
            None => {
                let k = record.pass_at_k;
                if k >= 1 && k <= record.attempts.len() {
                    record.attempts[k - 1].clone()
                } else {
                    String::new()
                }
            }
        };

        let everything = format!("{} {}", text, code);

        Self {
            text,
            code,
            everything,
        }
    }

    /// The projection a target designates.
    pub fn get(&self, target: Target) -> &str {
        match target {
            Target::Text => &self.text,
            Target::Code => &self.code,
            Target::All => &self.everything,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(code: Option<&str>, attempts: &[&str], pass_at_k: usize) -> Record {
        Record {
            problem_text: "How many ways?".to_string(),
            code: code.map(str::to_string),
            attempts: attempts.iter().map(|s| s.to_string()).collect(),
            pass_at_k,
            ..Record::default()
        }
    }

    #[test]
    fn test_direct_code_wins() {
        let view = FieldView::project(&record_with(Some("direct"), &["a", "b"], 2));
        assert_eq!(view.code, "direct");
    }

    #[test]
    fn test_attempt_resolution_is_one_based() {
        let view = FieldView::project(&record_with(None, &["first", "second"], 2));
        assert_eq!(view.code, "second");
    }

    #[test]
    fn test_pass_at_k_zero_means_no_code() {
        let view = FieldView::project(&record_with(None, &["first"], 0));
        assert_eq!(view.code, "");
    }

    #[test]
    fn test_out_of_range_index_means_no_code() {
        let view = FieldView::project(&record_with(None, &["first"], 5));
        assert_eq!(view.code, "");
    }

    #[test]
    fn test_everything_concatenates_text_and_code() {
        let view = FieldView::project(&record_with(Some("x = 1"), &[], 0));
        assert_eq!(view.everything, "How many ways? x = 1");
        assert_eq!(view.get(Target::All), view.everything);
    }

    #[test]
    fn test_empty_record_degrades_to_empty_views() {
        let view = FieldView::project(&Record::default());
        assert_eq!(view.text, "");
        assert_eq!(view.code, "");
        assert_eq!(view.everything, " ");
    }
}
