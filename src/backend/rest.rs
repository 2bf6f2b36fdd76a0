//! Table access over the REST interface (`/rest/v1/<table>`).
use super::{check_response, SupabaseClient};
use crate::constants::REST_PATH;
use crate::error::{AppError, AppResult};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;

/// Filter, ordering and paging parameters in the REST query-string syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to return; defaults to `*`.
    pub fn select(mut self, columns: &str) -> Self {
        self.params.retain(|(k, _)| k != "select");
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn in_list<S: AsRef<str>>(mut self, column: &str, values: &[S]) -> Self {
        let joined = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.to_string(), format!("in.({})", joined)));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{}.{}", column, direction)));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.params.retain(|(k, _)| k != "limit");
        self.params.push(("limit".to_string(), count.to_string()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// True when at least one row filter is present.
    pub fn has_filters(&self) -> bool {
        self.params
            .iter()
            .any(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit"))
    }

    fn with_default_select(&self) -> Vec<(String, String)> {
        let mut params = self.params.clone();
        if !params.iter().any(|(k, _)| k == "select") {
            params.insert(0, ("select".to_string(), "*".to_string()));
        }
        params
    }
}

fn table_path(table: &str) -> String {
    format!("{}/{}", REST_PATH, table)
}

impl SupabaseClient {
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> AppResult<Vec<T>> {
        log::debug!("SELECT {} {:?}", table, query.params());
        let response = self
            .request(Method::GET, &table_path(table))
            .query(&query.with_default_select())
            .send()
            .await?;
        let response = check_response(response).await?;
        Ok(response.json().await?)
    }

    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> AppResult<Option<T>> {
        let rows = self.select(table, &query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    async fn write_rows<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        query: &Query,
        prefer: &str,
        body: &B,
    ) -> AppResult<Vec<T>> {
        let response = self
            .request(method, &table_path(table))
            .query(query.params())
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;
        let response = check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Insert one row and return it as stored (with backend-assigned columns).
    pub async fn insert<T: Serialize + DeserializeOwned>(&self, table: &str, row: &T) -> AppResult<T> {
        log::debug!("INSERT {}", table);
        let rows: Vec<T> = self
            .write_rows(Method::POST, table, &Query::new(), "return=representation", row)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Insert into {} returned no row", table)))
    }

    /// Insert or merge on the primary key.
    pub async fn upsert<T: Serialize + DeserializeOwned>(&self, table: &str, row: &T) -> AppResult<T> {
        log::debug!("UPSERT {}", table);
        let rows: Vec<T> = self
            .write_rows(
                Method::POST,
                table,
                &Query::new(),
                "resolution=merge-duplicates,return=representation",
                row,
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Upsert into {} returned no row", table)))
    }

    /// Patch every row matching `query` and return the updated rows.
    pub async fn update<P: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        patch: &P,
    ) -> AppResult<Vec<T>> {
        if !query.has_filters() {
            return Err(AppError::InvalidInput(format!(
                "Refusing to update every row of {}",
                table
            )));
        }
        log::debug!("UPDATE {} {:?}", table, query.params());
        self.write_rows(Method::PATCH, table, query, "return=representation", patch)
            .await
    }

    pub async fn delete(&self, table: &str, query: &Query) -> AppResult<()> {
        if !query.has_filters() {
            return Err(AppError::InvalidInput(format!(
                "Refusing to delete every row of {}",
                table
            )));
        }
        log::debug!("DELETE {} {:?}", table, query.params());
        let response = self
            .request(Method::DELETE, &table_path(table))
            .query(query.params())
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }
}
