use reqwest::Client;
use tracing::debug;

use crate::{error::DirectoryError, model::CustomerRecord};

pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// Client for the remote customer directory.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    users_url: String,
    http: Client,
}

impl DirectoryClient {
    pub fn new(users_url: impl Into<String>, http: Client) -> Self {
        Self {
            users_url: users_url.into(),
            http,
        }
    }

    pub fn users_url(&self) -> &str {
        &self.users_url
    }

    /// Fetch the full customer list. Any failure here aborts the run.
    pub async fn fetch_customers(&self) -> Result<Vec<CustomerRecord>, DirectoryError> {
        let url = self.users_url.as_str();

        let res = self.http.get(url).send().await.map_err(|source| DirectoryError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = res.text().await.map_err(|source| DirectoryError::Request {
            url: url.to_string(),
            source,
        })?;

        let customers: Vec<CustomerRecord> =
            serde_json::from_str(&body).map_err(|source| DirectoryError::Decode {
                url: url.to_string(),
                source,
            })?;

        debug!(count = customers.len(), url, "fetched customer directory");
        Ok(customers)
    }
}
