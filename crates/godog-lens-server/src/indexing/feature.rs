//! Line-by-line header scan of one feature document.

use std::path::Path;

use godog_lens_patterns::{Header, classify};
use tracing::trace;

use super::FeatureRecord;

/// Parse the headers of one document into feature records.
///
/// Each `Feature:` line starts a fresh record; scenario and scenario outline
/// lines are attached to the nearest preceding feature. Scenarios that appear
/// before any feature have no owner and are dropped. Line numbers are
/// zero-based. Both `\n` and `\r\n` line endings are accepted.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use godog_lens_server::indexing::parse_feature_document;
///
/// let text = "Feature: Login\n\n  Scenario: Valid creds\n";
/// let records = parse_feature_document(Path::new("/w/login.feature"), text);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].scenario_line("Valid creds"), Some(2));
/// ```
#[must_use]
pub fn parse_feature_document(file_path: &Path, full_text: &str) -> Vec<FeatureRecord> {
    let mut records: Vec<FeatureRecord> = Vec::new();

    for (index, line) in full_text.lines().enumerate() {
        let Some(header) = classify(line) else {
            continue;
        };
        let Ok(line_number) = u32::try_from(index) else {
            break;
        };
        match header {
            Header::Feature(name) => {
                records.push(FeatureRecord::new(name, file_path, line_number));
            }
            Header::Scenario(name) | Header::ScenarioOutline(name) => {
                if let Some(current) = records.last_mut() {
                    current.push_scenario(name, line_number);
                } else {
                    trace!(
                        path = %file_path.display(),
                        line = line_number,
                        "dropping scenario declared before any feature"
                    );
                }
            }
        }
    }

    records
}

#[cfg(test)]
mod tests;
