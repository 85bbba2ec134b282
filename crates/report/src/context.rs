//! Template contexts.
//!
//! All numbers are formatted here so templates only place strings.

use costwatch_cost::{format_amount, format_percentage, CostRecord, DailySummary, MonthlySummary};
use serde::Serialize;

/// Resources shown in the "main resources" column of the monthly HTML table.
pub const MAIN_RESOURCE_LIMIT: usize = 5;

/// Resources listed per creator in the monthly text report.
pub const TEXT_RESOURCE_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct DailyAlertContext<'a> {
    pub date: &'a str,
    pub total: String,
    pub threshold: String,
    pub overage: String,
    pub resource_count: usize,
    pub top_count: usize,
    pub resources: Vec<RankedRow<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RankedRow<'a> {
    pub rank: usize,
    pub name: &'a str,
    pub resource_type: &'a str,
    pub resource_group: &'a str,
    pub creator: &'a str,
    pub cost: String,
}

impl<'a> DailyAlertContext<'a> {
    pub fn new(summary: &'a DailySummary) -> Self {
        let currency = summary.currency.as_str();
        let resources: Vec<RankedRow<'a>> = summary
            .top_resources
            .iter()
            .map(|ranked| RankedRow {
                rank: ranked.rank,
                name: &ranked.record.resource_name,
                resource_type: &ranked.record.resource_type,
                resource_group: &ranked.record.resource_group,
                creator: &ranked.creator,
                cost: format_amount(ranked.record.cost, currency),
            })
            .collect();

        Self {
            date: &summary.period.label,
            total: format_amount(summary.threshold.total_cost, currency),
            threshold: format_amount(summary.threshold.threshold, currency),
            overage: format_amount(summary.threshold.overage, currency),
            resource_count: summary.resource_count,
            top_count: resources.len(),
            resources,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyReportContext<'a> {
    pub month: &'a str,
    pub total: String,
    pub creator_count: usize,
    pub resource_count: usize,
    pub has_data: bool,
    pub creators: Vec<CreatorRow<'a>>,
}

#[derive(Debug, Serialize)]
pub struct CreatorRow<'a> {
    pub rank: usize,
    pub creator: &'a str,
    pub total: String,
    pub resource_count: usize,
    pub percentage: String,
    /// Top resources joined for a single table cell.
    pub main_resources: String,
    /// Every resource, for the HTML detail tables.
    pub resources: Vec<ResourceRow<'a>>,
    /// Leading slice of `resources` for the text report.
    pub listed: Vec<ResourceRow<'a>>,
    /// Resources left out of `listed`.
    pub more: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceRow<'a> {
    pub name: &'a str,
    pub resource_type: &'a str,
    pub resource_group: &'a str,
    pub cost: String,
}

impl<'a> ResourceRow<'a> {
    fn new(record: &'a CostRecord, currency: &str) -> Self {
        Self {
            name: &record.resource_name,
            resource_type: &record.resource_type,
            resource_group: &record.resource_group,
            cost: format_amount(record.cost, currency),
        }
    }
}

impl<'a> MonthlyReportContext<'a> {
    pub fn new(summary: &'a MonthlySummary) -> Self {
        let currency = summary.currency.as_str();

        let creators = summary
            .groups
            .iter()
            .enumerate()
            .map(|(idx, group)| {
                let resources: Vec<ResourceRow<'a>> = group
                    .resources
                    .iter()
                    .map(|record| ResourceRow::new(record, currency))
                    .collect();

                let mut main_resources = resources
                    .iter()
                    .take(MAIN_RESOURCE_LIMIT)
                    .map(|r| format!("{} ({})", r.name, r.cost))
                    .collect::<Vec<_>>()
                    .join(", ");
                if resources.len() > MAIN_RESOURCE_LIMIT {
                    main_resources.push_str(&format!(
                        " ... and {} resources in total",
                        resources.len()
                    ));
                }

                let listed: Vec<ResourceRow<'a>> =
                    resources.iter().take(TEXT_RESOURCE_LIMIT).cloned().collect();
                let more = resources.len() - listed.len();

                CreatorRow {
                    rank: idx + 1,
                    creator: &group.creator,
                    total: format_amount(group.total_cost, currency),
                    resource_count: group.resource_count,
                    percentage: format_percentage(group.percentage),
                    main_resources,
                    resources,
                    listed,
                    more,
                }
            })
            .collect();

        Self {
            month: &summary.period.label,
            total: format_amount(summary.total_cost, currency),
            creator_count: summary.creator_count(),
            resource_count: summary.resource_count,
            has_data: !summary.is_empty(),
            creators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use costwatch_cost::ReportPeriod;
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    fn record(name: &str, cost: i64, owner: &str) -> CostRecord {
        CostRecord {
            resource_id: format!("/rg/{name}"),
            resource_name: name.to_string(),
            resource_type: "Microsoft.Storage/storageAccounts".to_string(),
            resource_group: "rg".to_string(),
            cost: Decimal::from(cost),
            currency: "USD".to_string(),
            tags: HashMap::from([("Owner".to_string(), owner.to_string())]),
        }
    }

    fn month() -> ReportPeriod {
        ReportPeriod::previous_month(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
    }

    #[test]
    fn test_monthly_limits() {
        let records: Vec<CostRecord> = (1..=12)
            .map(|i| record(&format!("sa{i:02}"), i, "alice"))
            .collect();
        let summary = MonthlySummary::build(month(), &records);
        let ctx = MonthlyReportContext::new(&summary);

        let alice = &ctx.creators[0];
        assert_eq!(alice.resources.len(), 12);
        assert_eq!(alice.listed.len(), TEXT_RESOURCE_LIMIT);
        assert_eq!(alice.more, 2);
        assert_eq!(alice.listed[0].name, "sa12");
        assert!(alice
            .main_resources
            .starts_with("sa12 ($12.00), sa11 ($11.00)"));
        assert!(alice.main_resources.ends_with("sa08 ($8.00) ... and 12 resources in total"));
    }

    #[test]
    fn test_monthly_short_list_has_no_suffix() {
        let records = vec![record("a", 3, "bob"), record("b", 1, "bob")];
        let summary = MonthlySummary::build(month(), &records);
        let ctx = MonthlyReportContext::new(&summary);

        assert_eq!(ctx.month, "2024-01");
        assert_eq!(ctx.total, "$4.00");
        assert!(ctx.has_data);
        assert_eq!(ctx.creators[0].main_resources, "a ($3.00), b ($1.00)");
        assert_eq!(ctx.creators[0].more, 0);
        assert_eq!(ctx.creators[0].percentage, "100.0%");
    }
}
