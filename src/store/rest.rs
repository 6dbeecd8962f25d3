use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{DataStore, RowId, Table};
use crate::config::Config;
use crate::logger::{debug, trace, warn};

const REST_PATH: &str = "rest/v1";

/// The service refuses unfiltered deletes; no row carries the nil UUID,
/// so this filter matches all of them.
const MATCH_ALL: (&str, &str) = ("id", "neq.00000000-0000-0000-0000-000000000000");

/// PostgREST endpoint of the hosted backend, authenticated with the
/// service role key.
pub struct RestStore {
    client: Client,
    endpoint: String,
    api_key: HeaderValue,
    bearer: HeaderValue,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: RowId,
}

impl RestStore {
    pub fn new(config: &Config) -> Result<Self> {
        let mut api_key = HeaderValue::from_str(&config.service_key)
            .context("service role key is not a valid header value")?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .context("service role key is not a valid header value")?;
        bearer.set_sensitive(true);

        let client = Client::builder()
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/{}", config.url, REST_PATH),
            api_key,
            bearer,
        })
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        let url = format!("{}/{}", self.endpoint, table.name());
        self.client
            .request(method, url)
            .header("apikey", self.api_key.clone())
            .header(AUTHORIZATION, self.bearer.clone())
    }

    fn delete_request(&self, table: Table) -> RequestBuilder {
        self.request(Method::DELETE, table).query(&[MATCH_ALL])
    }

    fn insert_request(&self, table: Table, rows: &[Value]) -> RequestBuilder {
        self.request(Method::POST, table)
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
            .json(rows)
    }

    fn count_request(&self, table: Table) -> RequestBuilder {
        self.request(Method::HEAD, table)
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
    }

    fn send(&self, what: &str, table: Table, request: RequestBuilder) -> Result<Response> {
        debug(&format!("rest: {} {}", what, table));
        let response = request
            .send()
            .with_context(|| format!("{} request to {} failed", what, table))?;
        let status = response.status();
        debug(&format!("rest: {} {} -> {}", what, table, status));
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(anyhow!(describe_failure(status, &body)))
    }
}

impl DataStore for RestStore {
    fn delete_all(&self, table: Table) -> Result<()> {
        self.send("delete", table, self.delete_request(table))?;
        Ok(())
    }

    fn insert(&self, table: Table, rows: &[Value]) -> Result<Vec<RowId>> {
        trace(&format!(
            "rest: insert {} payload {}",
            table,
            serde_json::to_string(rows).unwrap_or_default()
        ));
        let response = self.send("insert", table, self.insert_request(table, rows))?;
        let inserted: Vec<InsertedRow> = response
            .json()
            .with_context(|| format!("unexpected insert response from {}", table))?;
        if inserted.len() != rows.len() {
            warn(&format!(
                "rest: {} returned {} ids for {} rows",
                table,
                inserted.len(),
                rows.len()
            ));
        }
        Ok(inserted.into_iter().map(|r| r.id).collect())
    }

    fn count(&self, table: Table) -> Result<u64> {
        let response = self.send("count", table, self.count_request(table))?;
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .ok_or_else(|| anyhow!("count response from {} has no Content-Range", table))?
            .to_str()
            .context("Content-Range is not valid text")?;
        parse_content_range(range)
    }
}

/// Total from a PostgREST `Content-Range` header: `0-54/55`, `*/0`.
fn parse_content_range(value: &str) -> Result<u64> {
    let Some((_, total)) = value.trim().rsplit_once('/') else {
        bail!("malformed Content-Range {:?}", value);
    };
    total
        .parse()
        .with_context(|| format!("Content-Range {:?} carries no exact count", value))
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ApiError>(body) {
        let mut msg = format!("{}: {}", status, err.message);
        if let Some(code) = err.code {
            msg.push_str(&format!(" ({})", code));
        }
        if let Some(details) = err.details {
            msg.push_str(&format!("; details: {}", details));
        }
        if let Some(hint) = err.hint {
            msg.push_str(&format!("; hint: {}", hint));
        }
        return msg;
    }
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> RestStore {
        RestStore::new(&Config {
            url: "https://demo.supabase.co".into(),
            service_key: "service-key".into(),
        })
        .unwrap()
    }

    fn header<'a>(request: &'a reqwest::blocking::Request, name: &str) -> &'a str {
        request.headers().get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn delete_matches_every_row() {
        let request = store().delete_request(Table::OrderItems).build().unwrap();
        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(
            request.url().as_str(),
            "https://demo.supabase.co/rest/v1/order_items?id=neq.00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(header(&request, "apikey"), "service-key");
        assert_eq!(header(&request, "authorization"), "Bearer service-key");
    }

    #[test]
    fn insert_posts_json_array_and_asks_for_ids() {
        let rows = vec![json!({"name": "Tea"}), json!({"name": "Cake"})];
        let request = store().insert_request(Table::Products, &rows).build().unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://demo.supabase.co/rest/v1/products?select=id"
        );
        assert_eq!(header(&request, "prefer"), "return=representation");
        assert_eq!(header(&request, "content-type"), "application/json");

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(sent, json!([{"name": "Tea"}, {"name": "Cake"}]));
    }

    #[test]
    fn count_uses_head_with_exact_count() {
        let request = store().count_request(Table::Customers).build().unwrap();
        assert_eq!(request.method(), &Method::HEAD);
        assert_eq!(
            request.url().as_str(),
            "https://demo.supabase.co/rest/v1/customers?select=id"
        );
        assert_eq!(header(&request, "prefer"), "count=exact");
    }

    #[test]
    fn key_headers_are_sensitive() {
        let request = store().count_request(Table::Customers).build().unwrap();
        assert!(request.headers().get("apikey").unwrap().is_sensitive());
        assert!(request.headers().get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn rejects_key_with_control_characters() {
        let err = RestStore::new(&Config {
            url: "https://demo.supabase.co".into(),
            service_key: "bad\nkey".into(),
        });
        assert!(err.is_err());
    }

    #[test]
    fn parses_content_range_totals() {
        assert_eq!(parse_content_range("0-54/55").unwrap(), 55);
        assert_eq!(parse_content_range("*/0").unwrap(), 0);
        assert!(parse_content_range("*/*").is_err());
        assert!(parse_content_range("55").is_err());
    }

    #[test]
    fn describes_postgrest_errors() {
        let body = r#"{"message":"relation \"public.refunds\" does not exist","code":"42P01","details":null,"hint":null}"#;
        assert_eq!(
            describe_failure(StatusCode::NOT_FOUND, body),
            "404 Not Found: relation \"public.refunds\" does not exist (42P01)"
        );

        let body = r#"{"message":"insert violates foreign key","code":"23503","details":"Key is not present","hint":"check user_id"}"#;
        assert_eq!(
            describe_failure(StatusCode::CONFLICT, body),
            "409 Conflict: insert violates foreign key (23503); details: Key is not present; hint: check user_id"
        );
    }

    #[test]
    fn describes_opaque_failures() {
        assert_eq!(
            describe_failure(StatusCode::BAD_GATEWAY, ""),
            "502 Bad Gateway"
        );
        assert_eq!(
            describe_failure(StatusCode::UNAUTHORIZED, "Invalid API key\n"),
            "401 Unauthorized: Invalid API key"
        );
    }
}
