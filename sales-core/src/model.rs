use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of the sales file.
///
/// Columns other than the five required ones are kept verbatim in `extra`,
/// in file order, so they survive enrichment untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub customer_id: u64,
    pub product: String,
    pub quantity: f64,
    pub price: f64,
    /// Raw `order_date` cell as it appeared in the file.
    pub order_date: String,
    #[serde(skip)]
    pub ordered_at: NaiveDateTime,
    #[serde(flatten)]
    pub extra: Passthrough,
}

/// Extra sales columns, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Passthrough(pub Vec<(String, String)>);

impl Passthrough {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == column).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Passthrough {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub geo: Geo,
}

/// A user as returned by the customer directory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub address: Address,
}

impl CustomerRecord {
    /// `"lat,lng"` string the weather service takes as its `q` parameter.
    pub fn location(&self) -> String {
        format!("{},{}", self.address.geo.lat, self.address.geo.lng)
    }
}

/// Current conditions at a customer's location.
///
/// Both fields are `None` when the weather service could not be reached or
/// answered with a non-success status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature: Option<f64>,
    pub conditions: Option<String>,
}

impl WeatherObservation {
    pub fn is_missing(&self) -> bool {
        self.temperature.is_none() && self.conditions.is_none()
    }
}

/// A sale joined with its customer and the weather at the customer's location.
///
/// Coordinates are used for the weather lookup only and are not carried over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedSale {
    #[serde(flatten)]
    pub sale: SaleRecord,
    pub name: String,
    pub username: String,
    pub email: String,
    pub weather: WeatherObservation,
}

impl EnrichedSale {
    /// Fields added on top of the sale; same-named passthrough columns are dropped.
    const OWN_FIELDS: [&'static str; 4] = ["name", "username", "email", "weather"];

    pub fn new(
        mut sale: SaleRecord,
        customer: &CustomerRecord,
        weather: WeatherObservation,
    ) -> Self {
        sale.extra.0.retain(|(column, _)| !Self::OWN_FIELDS.contains(&column.as_str()));

        Self {
            sale,
            name: customer.name.clone(),
            username: customer.username.clone(),
            email: customer.email.clone(),
            weather,
        }
    }
}
