use std::fmt::{self, Display, Formatter};

use crate::aggregate::{ConditionAverage, MonthlyTotal, Ranked, SalesSummary};

const UNKNOWN_CONDITION: &str = "unknown";

/// Human-readable rendering of all six views, in a fixed order.
impl Display for SalesSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        section(f, "Total Sales Amount per Customer", |f| {
            for (name, total) in &self.total_sales_per_customer {
                writeln!(f, "  {name:<30} {total:>12.2}")?;
            }
            Ok(())
        })?;

        section(f, "Average Order Quantity per Product", |f| {
            for (product, avg) in &self.average_quantity_per_product {
                writeln!(f, "  {product:<30} {avg:>12.2}")?;
            }
            Ok(())
        })?;

        section(f, "Top Selling Products", |f| ranked(f, &self.top_selling_products))?;
        section(f, "Top Selling Customers", |f| ranked(f, &self.top_selling_customers))?;

        section(f, "Monthly Sales Trend", |f| {
            for MonthlyTotal { month_end, total } in &self.monthly_sales_trend {
                let label = month_end.to_string();
                writeln!(f, "  {label:<30} {total:>12.2}")?;
            }
            Ok(())
        })?;

        section(f, "Average Sales Amount per Weather Condition", |f| {
            for ConditionAverage {
                conditions,
                average_price,
            } in &self.average_price_per_condition
            {
                let label = conditions.as_deref().unwrap_or(UNKNOWN_CONDITION);
                writeln!(f, "  {label:<30} {average_price:>12.2}")?;
            }
            Ok(())
        })
    }
}

fn section<F>(f: &mut Formatter<'_>, title: &str, body: F) -> fmt::Result
where
    F: FnOnce(&mut Formatter<'_>) -> fmt::Result,
{
    writeln!(f, "{title}:")?;
    body(f)?;
    writeln!(f)
}

fn ranked(f: &mut Formatter<'_>, entries: &[Ranked]) -> fmt::Result {
    for (i, Ranked { key, quantity }) in entries.iter().enumerate() {
        writeln!(f, "  {:>2}. {key:<26} {quantity:>12}", i + 1)?;
    }
    Ok(())
}

pub fn render_json(summary: &SalesSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn summary() -> SalesSummary {
        SalesSummary {
            total_sales_per_customer: BTreeMap::from([("Bob".to_string(), 10.0)]),
            average_quantity_per_product: BTreeMap::from([("A".to_string(), 2.0)]),
            top_selling_products: vec![Ranked { key: "A".into(), quantity: 2.0 }],
            top_selling_customers: vec![Ranked { key: "Bob".into(), quantity: 2.0 }],
            monthly_sales_trend: vec![MonthlyTotal {
                month_end: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
                total: 10.0,
            }],
            average_price_per_condition: vec![ConditionAverage {
                conditions: None,
                average_price: 10.0,
            }],
        }
    }

    #[test]
    fn text_report_lists_every_section_in_order() {
        let text = summary().to_string();

        let titles = [
            "Total Sales Amount per Customer:",
            "Average Order Quantity per Product:",
            "Top Selling Products:",
            "Top Selling Customers:",
            "Monthly Sales Trend:",
            "Average Sales Amount per Weather Condition:",
        ];
        let positions: Vec<_> = titles.iter().map(|t| text.find(t).expect(t)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(text.contains("2023-01-31"));
        assert!(text.contains(" 1. A"));
        assert!(text.contains("unknown"));
        assert!(text.contains("10.00"));
    }

    #[test]
    fn json_report_uses_null_for_unknown_conditions() {
        let json = render_json(&summary()).expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_sales_per_customer"]["Bob"], 10.0);
        assert_eq!(value["monthly_sales_trend"][0]["month_end"], "2023-01-31");
        assert!(value["average_price_per_condition"][0]["conditions"].is_null());
    }
}
