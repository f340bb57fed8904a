//! Run summary and validation reporting.

use plankwatch_core::Retailer;

/// Per-retailer tallies for one run.
#[derive(Debug)]
pub struct RetailerSummary {
    pub retailer: Retailer,
    pub regions_scraped: usize,
    pub regions_skipped: usize,
    pub regions_failed: usize,
    pub products_written: u64,
}

/// One post-run validation check outcome.
#[derive(Debug)]
pub struct HealthCheck {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl HealthCheck {
    pub fn new(name: &'static str, passed: bool, detail: String) -> Self {
        Self {
            name,
            passed,
            detail,
        }
    }
}

/// Everything the run produced, for the final log summary and the exit-code
/// decision.
#[derive(Debug, Default)]
pub struct RunReport {
    pub retailers: Vec<RetailerSummary>,
    pub stale_removed: u64,
    pub checks: Vec<HealthCheck>,
}

impl RunReport {
    #[must_use]
    pub fn all_checks_passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn log(&self) {
        for summary in &self.retailers {
            tracing::info!(
                retailer = summary.retailer.label(),
                scraped = summary.regions_scraped,
                skipped = summary.regions_skipped,
                failed = summary.regions_failed,
                products = summary.products_written,
                "retailer summary"
            );
        }
        tracing::info!(removed = self.stale_removed, "stale rows cleaned up");
        for check in &self.checks {
            if check.passed {
                tracing::info!(check = check.name, detail = %check.detail, "validation passed");
            } else {
                tracing::warn!(check = check.name, detail = %check.detail, "validation FAILED");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_passes_only_when_every_check_does() {
        let mut report = RunReport::default();
        assert!(report.all_checks_passed());

        report
            .checks
            .push(HealthCheck::new("coverage", true, "7/7".to_owned()));
        assert!(report.all_checks_passed());

        report
            .checks
            .push(HealthCheck::new("volume", false, "12 < 100".to_owned()));
        assert!(!report.all_checks_passed());
    }
}
