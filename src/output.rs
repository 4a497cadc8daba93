use colored::*;
use std::time::Duration;

use crate::sse_client::FeedEvent;

#[derive(Debug)]
pub struct TestResult {
    pub scenario: String,
    pub passed: bool,
    pub message: Option<String>,
    pub duration: Duration,
}

pub fn step(message: &str) {
    println!("{} {}", "→".blue(), message);
}

pub fn confirmed(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_event(event: &FeedEvent) {
    println!(
        "\n[{}] {} event received",
        "feed stream".bright_magenta().bold(),
        event.event_type.yellow()
    );

    if let Ok(pretty) = serde_json::to_string_pretty(&event.data) {
        println!("   {}", pretty.dimmed());
    }
}

pub fn summarize(results: &[TestResult]) -> (usize, usize) {
    let passed = results.iter().filter(|r| r.passed).count();
    (passed, results.len() - passed)
}

pub fn print_test_summary(results: &[TestResult]) {
    println!("\n{}", "=== TEST SUMMARY ===".bright_white().bold());

    let (passed, failed) = summarize(results);

    for result in results {
        let status = if result.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("[{}] {} ({:?})", status, result.scenario, result.duration);

        if let Some(msg) = &result.message {
            println!("      {}", msg.dimmed());
        }
    }

    println!(
        "\n{}: {} passed, {} failed",
        "Results".bold(),
        passed.to_string().green(),
        failed.to_string().red()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, passed: bool) -> TestResult {
        TestResult {
            scenario: name.to_string(),
            passed,
            message: None,
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn summarize_counts_passes_and_failures() {
        let results = vec![result("a", true), result("b", false), result("c", true)];
        assert_eq!(summarize(&results), (2, 1));
    }

    #[test]
    fn summarize_handles_empty_run() {
        assert_eq!(summarize(&[]), (0, 0));
    }
}
