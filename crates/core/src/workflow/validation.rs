use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::status::{StatusCategory, StatusConfig};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub category: StatusCategory,
    pub status: String,
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} status `{}`: {} {}", self.category, self.status, self.field, self.message)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<FieldIssue>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_issue(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    fn push(
        &mut self,
        status: &StatusConfig,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.issues.push(FieldIssue {
            category: status.category,
            status: status.name.clone(),
            field: field.into(),
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status configuration is invalid ({} issue(s))", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Whole-configuration checks run before anything is written to the store.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(quote: &[StatusConfig], order: &[StatusConfig]) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::default();
        let known_names: HashSet<&str> =
            quote.iter().chain(order.iter()).map(|status| status.name.as_str()).collect();

        validate_category(StatusCategory::Quote, quote, &known_names, &mut report);
        validate_category(StatusCategory::Order, order, &known_names, &mut report);

        if report.is_empty() {
            Ok(())
        } else {
            Err(report)
        }
    }
}

fn validate_category(
    category: StatusCategory,
    statuses: &[StatusConfig],
    known_names: &HashSet<&str>,
    report: &mut ValidationReport,
) {
    let mut seen_names = HashSet::new();
    let mut default_count = 0usize;

    for status in statuses {
        if status.category != category {
            report.push(status, "category", format!("must be `{category}` in the {category} list"));
        }

        if status.name.trim().is_empty() {
            report.push(status, "name", "must not be empty");
        } else if !seen_names.insert(status.name.as_str()) {
            report.push(status, "name", format!("duplicates another {category} status"));
        }

        if status.order <= 0 {
            report.push(status, "order", "must be a positive position");
        }

        if status.progress_percentage > 100 {
            report.push(status, "progressPercentage", "must be within 0..=100");
        }

        if let Some(minimum) = status.min_payment_percentage {
            if !is_percentage(minimum) {
                report.push(status, "minPaymentPercentage", "must be within 0..=100");
            }
        }

        for (index, milestone) in status.payment_milestones.iter().enumerate() {
            if !is_percentage(milestone.percentage) {
                report.push(
                    status,
                    format!("paymentMilestones[{index}].percentage"),
                    "must be within 0..=100",
                );
            }
            if milestone.label.trim().is_empty() {
                report.push(status, format!("paymentMilestones[{index}].label"), "must not be empty");
            }
        }

        for target in &status.allowed_transitions {
            if !known_names.contains(target.as_str()) {
                report.push(
                    status,
                    "allowedTransitions",
                    format!("references unknown status `{target}`"),
                );
            }
        }

        if status.triggers_email
            && status.email_template.as_deref().map(str::trim).unwrap_or("").is_empty()
        {
            report.push(status, "emailTemplate", "is required when triggersEmail is set");
        }

        if status.is_default_quote_status {
            if category == StatusCategory::Order {
                report.push(status, "isDefaultQuoteStatus", "is only meaningful for quote statuses");
            }
            default_count += 1;
            if default_count > 1 {
                report.push(
                    status,
                    "isDefaultQuoteStatus",
                    format!("only one {category} status may be the default"),
                );
            }
        }
    }

    let mut positions: Vec<i32> = statuses.iter().map(|status| status.order).collect();
    positions.sort_unstable();
    let dense = positions.iter().enumerate().all(|(index, order)| *order == index as i32 + 1);
    if !dense && positions.iter().all(|order| *order > 0) {
        if let Some(first) = statuses.first() {
            report.push(first, "order", format!("{category} positions must run 1..=n without gaps or repeats"));
        }
    }
}

fn is_percentage(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED
}
