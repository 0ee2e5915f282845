//! Reading the sales file into typed [`SaleRecord`]s.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

use crate::{
    error::LoadError,
    model::{Passthrough, SaleRecord},
};

const REQUIRED: [&str; 5] = ["customer_id", "product", "quantity", "price", "order_date"];

/// Column positions of the required fields, resolved once from the header row.
struct Columns {
    customer_id: usize,
    product: usize,
    quantity: usize,
    price: usize,
    order_date: usize,
    extra: Vec<(usize, String)>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(LoadError::MissingColumn(name))
        };

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !REQUIRED.contains(h))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        Ok(Self {
            customer_id: find("customer_id")?,
            product: find("product")?,
            quantity: find("quantity")?,
            price: find("price")?,
            order_date: find("order_date")?,
            extra,
        })
    }
}

/// Read sales from any delimited text source with a header row.
pub fn read_sales<R: Read>(reader: R, delimiter: u8) -> Result<Vec<SaleRecord>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::resolve(rdr.headers()?)?;

    let mut sales = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        sales.push(parse_row(&record, &columns, line)?);
    }

    debug!(rows = sales.len(), "loaded sales records");
    Ok(sales)
}

/// Open `path` and read it with [`read_sales`].
pub fn read_sales_file(path: &Path, delimiter: u8) -> Result<Vec<SaleRecord>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Open(path.to_path_buf(), e))?;
    read_sales(file, delimiter)
}

fn parse_row(record: &StringRecord, columns: &Columns, line: u64) -> Result<SaleRecord, LoadError> {
    let cell = |idx: usize, column: &'static str| match record.get(idx) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(LoadError::MissingValue { line, column }),
    };

    let customer_id = parse_number(cell(columns.customer_id, "customer_id")?, "customer_id", line)?;
    let product = cell(columns.product, "product")?.to_string();
    let quantity = parse_number(cell(columns.quantity, "quantity")?, "quantity", line)?;
    let price = parse_number(cell(columns.price, "price")?, "price", line)?;

    let order_date = cell(columns.order_date, "order_date")?.to_string();
    let ordered_at = parse_order_date(&order_date).ok_or_else(|| LoadError::InvalidDate {
        line,
        value: order_date.clone(),
    })?;

    let extra = columns
        .extra
        .iter()
        .map(|(idx, name)| (name.clone(), record.get(*idx).unwrap_or_default().to_string()))
        .collect();

    Ok(SaleRecord {
        customer_id,
        product,
        quantity,
        price,
        order_date,
        ordered_at,
        extra: Passthrough(extra),
    })
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    column: &'static str,
    line: u64,
) -> Result<T, LoadError> {
    value.parse().map_err(|_| LoadError::InvalidValue {
        line,
        column,
        value: value.to_string(),
    })
}

/// Accepts plain dates, naive timestamps and RFC 3339.
///
/// An offset is dropped, not applied: the wall-clock time written in the file is kept.
pub fn parse_order_date(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 3] =
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
