//! Per-entity service objects over [`ApiClient`].

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::client::{ApiClient, QueryParams};
use crate::error::Result;
use crate::models::{Account, Department, Fee, LoginRequest, LoginResponse, Page, Program, Row};

/// Read and delete access to one backend collection, e.g. `/api/v1/students`.
pub struct Resource<'a, T> {
    client: &'a ApiClient,
    path: &'static str,
    _marker: PhantomData<T>,
}

impl<'a, T> Resource<'a, T>
where
    T: DeserializeOwned,
{
    fn new(client: &'a ApiClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _marker: PhantomData,
        }
    }

    /// Collection path, e.g. `/students`.
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// One page of records as loose rows for the generic table.
    pub async fn list(&self, query: &QueryParams) -> Result<Page<Row>> {
        self.client.get_json(self.path, query).await
    }

    /// Every record without pagination, typed.
    pub async fn all(&self) -> Result<Vec<T>> {
        self.client.get_json(&format!("{}/all", self.path), &[]).await
    }

    /// Full filtered dataset from the collection's `/report` endpoint.
    pub async fn report(&self, query: &QueryParams) -> Result<Vec<Row>> {
        self.client.get_json(&format!("{}/report", self.path), query).await
    }

    /// Delete a record by ID.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("{}/{id}", self.path)).await
    }
}

/// Body of `POST /email/payment-reminder`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReminder {
    pub student_ids: Vec<i64>,
    pub fee_id: i64,
}

impl ApiClient {
    pub fn fees(&self) -> Resource<'_, Fee> {
        Resource::new(self, "/fees")
    }

    pub fn accounts(&self) -> Resource<'_, Account> {
        Resource::new(self, "/accounts")
    }

    pub fn programs(&self) -> Resource<'_, Program> {
        Resource::new(self, "/programs")
    }

    pub fn departments(&self) -> Resource<'_, Department> {
        Resource::new(self, "/departments")
    }

    /// Untyped access to any collection path; used by the generic entity pages.
    pub fn rows(&self, path: &'static str) -> Resource<'_, Row> {
        Resource::new(self, path)
    }

    /// Exchange credentials for a token and profile.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post_json("/auth/login", &body).await
    }

    /// Ask the backend to email payment reminders for one fee.
    pub async fn send_payment_reminder(&self, reminder: &PaymentReminder) -> Result<()> {
        self.post_unit("/email/payment-reminder", reminder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[test]
    fn test_resource_paths() {
        let api = ApiClient::new(&ApiConfig::default()).unwrap();
        assert_eq!(api.fees().path(), "/fees");
        assert_eq!(api.accounts().path(), "/accounts");
        assert_eq!(api.rows("/expenses").path(), "/expenses");
    }

    #[test]
    fn test_reminder_body() {
        let body = PaymentReminder {
            student_ids: vec![1, 2],
            fee_id: 9,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"studentIds": [1, 2], "feeId": 9})
        );
    }
}
