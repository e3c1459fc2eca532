use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use std::sync::Arc;

use super::store::{
    Access, Connector, DataAccess, Filter, Join, Projection, Row, Select, StoreError,
};
use crate::config::StoreConfig;

/// Client for the store's PostgREST interface (`<url>/rest/v1/<collection>`).
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    config: Arc<StoreConfig>,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("kora_api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }
}

impl Connector for RestStore {
    type Session = RestSession;

    fn session(&self, access: Access) -> RestSession {
        let (api_key, authorization) = match access {
            Access::Caller(header) => {
                let key = self.config.anon_key.clone();
                let authorization = header.unwrap_or_else(|| format!("Bearer {key}"));
                (key, authorization)
            }
            Access::Privileged => {
                let key = self.config.service_role_key.clone();
                let authorization = format!("Bearer {key}");
                (key, authorization)
            }
        };

        RestSession {
            client: self.client.clone(),
            base_url: format!("{}/rest/v1", self.config.url),
            api_key,
            authorization,
        }
    }
}

/// Requests made with one credential.
#[derive(Debug, Clone)]
pub struct RestSession {
    client: Client,
    base_url: String,
    api_key: String,
    authorization: String,
}

/// Error body PostgREST answers with
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl RestSession {
    fn request(&self, method: Method, collection: &str) -> RequestBuilder {
        tracing::debug!("{} {}/{}", method, self.base_url, collection);
        self.client
            .request(method, format!("{}/{}", self.base_url, collection))
            .header("apikey", &self.api_key)
            .header("Authorization", &self.authorization)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.message,
            Err(_) if !body.trim().is_empty() => body,
            Err(_) => status.to_string(),
        };

        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl DataAccess for RestSession {
    async fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        let request = self
            .request(Method::GET, query.collection)
            .query(&query_params(query));

        self.send(request)
            .await?
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn select_one(&self, query: &Select) -> Result<Option<Row>, StoreError> {
        let single = query.clone().limit(1);
        Ok(self.select(&single).await?.into_iter().next())
    }

    async fn update(
        &self,
        collection: &'static str,
        filters: &[Filter],
        fields: Row,
    ) -> Result<(), StoreError> {
        let params: Vec<(String, String)> = filters.iter().map(filter_param).collect();
        let request = self
            .request(Method::PATCH, collection)
            .query(&params)
            .header("Prefer", "return=minimal")
            .json(&fields);

        self.send(request).await.map(|_| ())
    }

    async fn insert(&self, collection: &'static str, record: Row) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, collection)
            .header("Prefer", "return=minimal")
            .json(&record);

        self.send(request).await.map(|_| ())
    }
}

fn filter_param(filter: &Filter) -> (String, String) {
    (filter.column.to_string(), format!("eq.{}", filter.value))
}

/// `select` column list: every column plus one embedded resource per join.
fn select_param(joins: &[Join]) -> String {
    let mut columns = vec!["*".to_string()];
    for join in joins {
        let fields = match &join.projection {
            Projection::All => "*".to_string(),
            Projection::Fields(fields) => fields.join(","),
        };
        let embed = if join.key == join.collection {
            format!("{}({})", join.collection, fields)
        } else {
            format!(
                "{}:{}!{}({})",
                join.key, join.collection, join.foreign_key, fields
            )
        };
        columns.push(embed);
    }
    columns.join(",")
}

fn query_params(query: &Select) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), select_param(&query.joins))];
    params.extend(query.filters.iter().map(filter_param));
    if let Some(order) = &query.order {
        params.push((
            "order".to_string(),
            format!("{}.{}", order.column, order.direction.as_str()),
        ));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}
