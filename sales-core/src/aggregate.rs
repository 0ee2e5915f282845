//! Summary views over enriched sales.
//!
//! Every view is independent and total: an empty input gives an empty view.
//! Grouped views iterate keys in ascending order; rankings break ties the same way.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::EnrichedSale;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub key: String,
    pub quantity: f64,
}

/// Sales total for the calendar month ending on `month_end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month_end: NaiveDate,
    pub total: f64,
}

/// Mean price for one weather condition; `None` collects failed lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionAverage {
    pub conditions: Option<String>,
    pub average_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub total_sales_per_customer: BTreeMap<String, f64>,
    pub average_quantity_per_product: BTreeMap<String, f64>,
    pub top_selling_products: Vec<Ranked>,
    pub top_selling_customers: Vec<Ranked>,
    pub monthly_sales_trend: Vec<MonthlyTotal>,
    pub average_price_per_condition: Vec<ConditionAverage>,
}

impl SalesSummary {
    pub fn compute(sales: &[EnrichedSale], top_n: usize) -> Self {
        Self {
            total_sales_per_customer: total_sales_per_customer(sales),
            average_quantity_per_product: average_quantity_per_product(sales),
            top_selling_products: top_selling_products(sales, top_n),
            top_selling_customers: top_selling_customers(sales, top_n),
            monthly_sales_trend: monthly_sales_trend(sales),
            average_price_per_condition: average_price_per_condition(sales),
        }
    }
}

/// Running sum and count for a mean.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }
}

pub fn total_sales_per_customer(sales: &[EnrichedSale]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for s in sales {
        *totals.entry(s.name.clone()).or_insert(0.0) += s.sale.price;
    }
    totals
}

pub fn average_quantity_per_product(sales: &[EnrichedSale]) -> BTreeMap<String, f64> {
    let mut means: BTreeMap<String, Mean> = BTreeMap::new();
    for s in sales {
        means
            .entry(s.sale.product.clone())
            .or_default()
            .push(s.sale.quantity);
    }
    means.into_iter().map(|(k, m)| (k, m.value())).collect()
}

pub fn top_selling_products(sales: &[EnrichedSale], n: usize) -> Vec<Ranked> {
    top_by_quantity(sales, n, |s| &s.sale.product)
}

pub fn top_selling_customers(sales: &[EnrichedSale], n: usize) -> Vec<Ranked> {
    top_by_quantity(sales, n, |s| &s.name)
}

fn top_by_quantity<F>(sales: &[EnrichedSale], n: usize, key: F) -> Vec<Ranked>
where
    F: Fn(&EnrichedSale) -> &String,
{
    let mut sums: BTreeMap<&String, f64> = BTreeMap::new();
    for s in sales {
        *sums.entry(key(s)).or_insert(0.0) += s.sale.quantity;
    }

    let mut ranked: Vec<Ranked> = sums
        .into_iter()
        .map(|(key, quantity)| Ranked {
            key: key.clone(),
            quantity,
        })
        .collect();

    // stable: equal quantities stay in key order
    ranked.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
    ranked.truncate(n);
    ranked
}

/// Price summed per calendar month, labelled by month end, oldest first.
///
/// Months between the first and last sale that have no sales are reported
/// with a zero total.
pub fn monthly_sales_trend(sales: &[EnrichedSale]) -> Vec<MonthlyTotal> {
    let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for s in sales {
        let date = s.sale.ordered_at.date();
        *buckets.entry((date.year(), date.month())).or_insert(0.0) += s.sale.price;
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    let mut trend = Vec::new();
    let mut current = first;
    while current <= last {
        if let Some(month_end) = month_end(current.0, current.1) {
            trend.push(MonthlyTotal {
                month_end,
                total: buckets.get(&current).copied().unwrap_or(0.0),
            });
        }
        current = next_month(current);
    }
    trend
}

fn next_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (y, m) = next_month((year, month));
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}

/// Mean price per weather description. The failed-lookup bucket comes last.
pub fn average_price_per_condition(sales: &[EnrichedSale]) -> Vec<ConditionAverage> {
    let mut means: BTreeMap<Option<&str>, Mean> = BTreeMap::new();
    for s in sales {
        means
            .entry(s.weather.conditions.as_deref())
            .or_default()
            .push(s.sale.price);
    }

    let unknown = means.remove(&None);
    means
        .into_iter()
        .chain(unknown.map(|m| (None, m)))
        .map(|(conditions, m)| ConditionAverage {
            conditions: conditions.map(str::to_string),
            average_price: m.value(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        loader::parse_order_date,
        model::{Passthrough, SaleRecord, WeatherObservation},
    };

    fn enriched(
        name: &str,
        product: &str,
        qty: f64,
        price: f64,
        date: &str,
        cond: Option<&str>,
    ) -> EnrichedSale {
        EnrichedSale {
            sale: SaleRecord {
                customer_id: 1,
                product: product.to_string(),
                quantity: qty,
                price,
                order_date: date.to_string(),
                ordered_at: parse_order_date(date).unwrap(),
                extra: Passthrough::default(),
            },
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@x.com", name.to_lowercase()),
            weather: WeatherObservation {
                temperature: cond.map(|_| 15.0),
                conditions: cond.map(str::to_string),
            },
        }
    }

    fn sample() -> Vec<EnrichedSale> {
        vec![
            enriched("Bob", "A", 2.0, 10.0, "2023-01-05", Some("clear sky")),
            enriched("Bob", "B", 1.0, 4.0, "2023-01-20", Some("rain")),
            enriched("Ann", "A", 4.0, 20.0, "2023-03-02", Some("clear sky")),
            enriched("Cid", "C", 1.0, 6.0, "2023-03-31", None),
        ]
    }

    #[test]
    fn totals_per_customer() {
        let totals = total_sales_per_customer(&sample());

        assert_eq!(totals["Bob"], 14.0);
        assert_eq!(totals["Ann"], 20.0);
        assert_eq!(totals["Cid"], 6.0);
        assert_eq!(totals.keys().collect::<Vec<_>>(), ["Ann", "Bob", "Cid"]);
    }

    #[test]
    fn average_quantity() {
        let avg = average_quantity_per_product(&sample());

        assert_eq!(avg["A"], 3.0);
        assert_eq!(avg["B"], 1.0);
    }

    #[test]
    fn rankings_are_descending_and_capped() {
        let sales: Vec<_> = ["p1", "p2", "p3", "p4", "p5", "p6", "p7"]
            .iter()
            .enumerate()
            .map(|(i, p)| enriched("Bob", p, i as f64 + 1.0, 1.0, "2023-01-01", None))
            .collect();

        let top = top_selling_products(&sales, DEFAULT_TOP_N);

        assert_eq!(top.len(), 5);
        let keys: Vec<_> = top.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["p7", "p6", "p5", "p4", "p3"]);
        assert!(top.windows(2).all(|w| w[0].quantity >= w[1].quantity));
    }

    #[test]
    fn ranking_ties_follow_key_order() {
        let sales = vec![
            enriched("Zed", "X", 3.0, 1.0, "2023-01-01", None),
            enriched("Amy", "Y", 3.0, 1.0, "2023-01-01", None),
            enriched("Max", "Z", 5.0, 1.0, "2023-01-01", None),
        ];

        let top = top_selling_customers(&sales, 2);

        assert_eq!(
            top,
            vec![
                Ranked { key: "Max".into(), quantity: 5.0 },
                Ranked { key: "Amy".into(), quantity: 3.0 },
            ]
        );
    }

    #[test]
    fn monthly_trend_fills_gaps_with_zero() {
        let trend = monthly_sales_trend(&sample());

        let month = |m, d, total| MonthlyTotal {
            month_end: NaiveDate::from_ymd_opt(2023, m, d).unwrap(),
            total,
        };
        let expected = vec![month(1, 31, 14.0), month(2, 28, 0.0), month(3, 31, 26.0)];
        assert_eq!(trend, expected);
    }

    #[test]
    fn monthly_trend_crosses_year_boundary() {
        let sales = vec![
            enriched("Bob", "A", 1.0, 2.0, "2024-02-29", None),
            enriched("Bob", "A", 1.0, 3.0, "2023-12-15", None),
        ];

        let months: Vec<_> = monthly_sales_trend(&sales).iter().map(|m| m.month_end).collect();

        assert_eq!(
            months,
            [
                NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            ]
        );
    }

    #[test]
    fn monthly_trend_uses_wall_clock_month_of_offset_dates() {
        let data = "customer_id,product,quantity,price,order_date\n\
                    1,A,1,10.0,2023-08-01T00:30:00+02:00\n";
        let sale = crate::loader::read_sales(data.as_bytes(), b',')
            .expect("valid csv")
            .remove(0);
        let mut e = enriched("Bob", "A", 1.0, 10.0, "2023-08-01", None);
        e.sale = sale;

        let trend = monthly_sales_trend(&[e]);

        assert_eq!(
            trend,
            vec![MonthlyTotal {
                month_end: NaiveDate::from_ymd_opt(2023, 8, 31).unwrap(),
                total: 10.0,
            }]
        );
    }

    #[test]
    fn negative_quantities_reduce_product_totals() {
        let sales = vec![
            enriched("Bob", "A", 3.0, 1.0, "2023-01-01", None),
            enriched("Bob", "A", -1.0, 1.0, "2023-01-02", None),
            enriched("Ann", "B", 2.5, 1.0, "2023-01-03", None),
        ];

        let top = top_selling_products(&sales, DEFAULT_TOP_N);

        assert_eq!(
            top,
            vec![
                Ranked { key: "B".into(), quantity: 2.5 },
                Ranked { key: "A".into(), quantity: 2.0 },
            ]
        );
        assert_eq!(average_quantity_per_product(&sales)["A"], 1.0);
    }

    #[test]
    fn condition_averages_include_unknown_last() {
        let avgs = average_price_per_condition(&sample());

        assert_eq!(
            avgs,
            vec![
                ConditionAverage {
                    conditions: Some("clear sky".into()),
                    average_price: 15.0,
                },
                ConditionAverage {
                    conditions: Some("rain".into()),
                    average_price: 4.0,
                },
                ConditionAverage {
                    conditions: None,
                    average_price: 6.0,
                },
            ]
        );
    }

    #[test]
    fn empty_input_gives_empty_views() {
        let summary = SalesSummary::compute(&[], DEFAULT_TOP_N);

        assert!(summary.total_sales_per_customer.is_empty());
        assert!(summary.average_quantity_per_product.is_empty());
        assert!(summary.top_selling_products.is_empty());
        assert!(summary.top_selling_customers.is_empty());
        assert!(summary.monthly_sales_trend.is_empty());
        assert!(summary.average_price_per_condition.is_empty());
    }
}
