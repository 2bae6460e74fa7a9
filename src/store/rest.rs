use async_trait::async_trait;
use reqwest::{
    Method, RequestBuilder, Response,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use serde_json::Value;

use super::{Direction, Record, SelectQuery, StoreError, Table, TableStore, check_identifier};

// Tables live under `{base_url}/rest/v1/{table}`.
#[derive(Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl RestStore {
    pub fn new(url: &str, key: &str) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(key)
            .map_err(|_| StoreError::Connection("STORE_KEY is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| StoreError::Connection("STORE_KEY is not a valid header value".into()))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            http,
            base_url: rest_base(url),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.base_url, table.name())
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("Prefer", "return=representation")
    }

    async fn rows(resp: Response) -> Result<Vec<Record>, StoreError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(http_error(status.as_u16(), &body));
        }
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str::<Vec<Record>>(&text)
            .map_err(|e| StoreError::Decode(format!("response body: {e}")))
    }
}

fn rest_base(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with("/rest/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/rest/v1")
    }
}

fn http_error(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<RestErrorBody>(body) {
        Ok(parsed) => {
            let mut message = parsed.message.unwrap_or_else(|| body.to_string());
            if let Some(details) = parsed.details.filter(|d| !d.is_empty()) {
                message = format!("{message} ({details})");
            }
            if let Some(hint) = parsed.hint.filter(|h| !h.is_empty()) {
                message = format!("{message}; hint: {hint}");
            }
            StoreError::Http {
                status,
                code: parsed.code,
                message,
            }
        }
        Err(_) => StoreError::Http {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}

/// Renders a JSON filter value the way PostgREST expects it after `eq.`.
fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn select_params(query: &SelectQuery) -> Result<Vec<(String, String)>, StoreError> {
    let mut select = "*".to_string();
    if let Some(embed) = &query.embed {
        check_identifier(&embed.foreign_key)?;
        for column in &embed.columns {
            check_identifier(column)?;
        }
        select = format!(
            "*,{}!{}({})",
            embed.table.name(),
            embed.foreign_key,
            embed.columns.join(",")
        );
    }

    let mut params = vec![("select".to_string(), select)];
    for (column, value) in &query.filters {
        check_identifier(column)?;
        params.push((column.clone(), format!("eq.{}", filter_value(value))));
    }
    if let Some((column, direction)) = &query.order {
        check_identifier(column)?;
        let dir = match direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        params.push(("order".to_string(), format!("{column}.{dir}")));
    }
    Ok(params)
}

fn id_filter(id: i64) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait]
impl TableStore for RestStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError> {
        let params = select_params(query)?;
        let resp = self
            .http
            .get(self.table_url(query.table))
            .query(&params)
            .send()
            .await?;
        Self::rows(resp).await
    }

    async fn insert(&self, table: Table, values: Record) -> Result<Record, StoreError> {
        let resp = self
            .request(Method::POST, table)
            .json(&Value::Object(values))
            .send()
            .await?;
        Self::rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".into()))
    }

    async fn update(
        &self,
        table: Table,
        id: i64,
        changes: Record,
    ) -> Result<Vec<Record>, StoreError> {
        let resp = self
            .request(Method::PATCH, table)
            .query(&id_filter(id))
            .json(&Value::Object(changes))
            .send()
            .await?;
        Self::rows(resp).await
    }

    async fn delete(&self, table: Table, id: i64) -> Result<Vec<Record>, StoreError> {
        let resp = self
            .request(Method::DELETE, table)
            .query(&id_filter(id))
            .send()
            .await?;
        Self::rows(resp).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn base_url_gains_rest_prefix_once() {
        assert_eq!(rest_base("https://x.example.co/"), "https://x.example.co/rest/v1");
        assert_eq!(
            rest_base("https://x.example.co/rest/v1"),
            "https://x.example.co/rest/v1"
        );
    }

    #[test]
    fn select_params_include_embed_filter_and_order() {
        let query = SelectQuery::from(Table::Products)
            .eq("category_id", 3)
            .order_by("id", Direction::Desc)
            .embed(Table::Categories, "category_id", &["name"]);
        let params = select_params(&query).unwrap();
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*,categories!category_id(name)".to_string()),
                ("category_id".to_string(), "eq.3".to_string()),
                ("order".to_string(), "id.desc".to_string()),
            ]
        );
    }

    #[test]
    fn error_body_keeps_code_and_details() {
        let body = json!({
            "code": "42703",
            "message": "column products.quantity does not exist",
            "details": null,
            "hint": "Perhaps you meant description"
        })
        .to_string();
        let err = http_error(400, &body);
        assert_eq!(err.code(), Some("42703"));
        assert_eq!(err.http_status(), Some(400));
        assert!(err.to_string().contains("hint: Perhaps"));
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        let err = http_error(502, "bad gateway");
        assert_eq!(err.code(), None);
        assert!(err.to_string().contains("bad gateway"));
    }
}
