use std::future::Future;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::*;
use serde_json::Value;

use crate::output::TestResult;

pub mod auth;
pub mod courses;
pub mod feed;
pub mod materials;
pub mod quizzes;

/// Index of the first item in a JSON listing whose field matches, used by
/// the newest-first ordering checks.
pub(crate) fn position_by(listing: &Value, field: &str, value: &str) -> Result<usize> {
    listing
        .as_array()
        .context("listing is not an array")?
        .iter()
        .position(|item| item[field] == value)
        .with_context(|| format!("no item with {} == {:?} in listing", field, value))
}

/// Runs one scenario, turning an assertion failure into a failed result
/// instead of aborting the whole run.
pub async fn run<F>(scenario: &str, test: F) -> TestResult
where
    F: Future<Output = Result<()>>,
{
    let start = Instant::now();
    println!(
        "\n{}",
        format!("=== TEST: {} ===", scenario).bright_cyan().bold()
    );

    match test.await {
        Ok(()) => {
            println!("{} {}", "✓".green(), scenario);
            TestResult {
                scenario: scenario.to_string(),
                passed: true,
                message: None,
                duration: start.elapsed(),
            }
        }
        Err(e) => {
            println!("{} {}: {:#}", "✗".red(), scenario, e);
            TestResult {
                scenario: scenario.to_string(),
                passed: false,
                message: Some(format!("{:#}", e)),
                duration: start.elapsed(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn position_by_finds_items_by_field() {
        let listing = json!([
            { "name": "Third" },
            { "name": "Second" },
            { "name": "First" },
        ]);
        assert_eq!(position_by(&listing, "name", "Second").unwrap(), 1);
    }

    #[test]
    fn position_by_reports_missing_items() {
        let listing = json!([{ "name": "only" }]);
        assert!(position_by(&listing, "name", "other").is_err());
    }

    #[test]
    fn position_by_rejects_non_arrays() {
        assert!(position_by(&json!({}), "name", "x").is_err());
    }
}
