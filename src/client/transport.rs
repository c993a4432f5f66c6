use reqwest::Method;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use tracing::{debug, instrument};

use super::ClientError;
use crate::error::ErrorBody;

/// Raw status and body of an API reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

/// Sends requests to the API. Paths are relative to `/api`.
#[rocket::async_trait(?Send)]
pub trait Transport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Reply, ClientError>;
}

#[rocket::async_trait(?Send)]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Reply, ClientError> {
        (**self).send(method, path, body).await
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[rocket::async_trait(?Send)]
impl Transport for HttpTransport {
    #[instrument(skip(self, body), fields(base_url = %self.base_url))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Reply, ClientError> {
        let url = format!("{}/api{}", self.base_url, path);
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "Received API reply");

        Ok(Reply { status, body })
    }
}

/// Decodes a reply, turning non-2xx statuses and `success: false` bodies into errors.
pub fn decode<T: DeserializeOwned>(reply: Reply) -> Result<T, ClientError> {
    let value: Value = match serde_json::from_str(&reply.body) {
        Ok(value) => value,
        Err(_) if !is_success(reply.status) => {
            return Err(ClientError::Api {
                status: reply.status,
                message: reply.body,
            });
        }
        Err(err) => return Err(ClientError::Decode(err)),
    };

    let succeeded = value.get("success").and_then(Value::as_bool).unwrap_or(true);
    if !is_success(reply.status) || !succeeded {
        let message = serde_json::from_value::<ErrorBody>(value)
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", reply.status));
        return Err(ClientError::Api {
            status: reply.status,
            message,
        });
    }

    Ok(serde_json::from_value(value)?)
}

/// Pulls one named field out of a successful reply, e.g. `students` from a list.
pub fn decode_field<T: DeserializeOwned>(reply: Reply, field: &str) -> Result<T, ClientError> {
    let mut value: Value = decode(reply)?;
    let field_value = value
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| serde_json::Error::custom(format!("missing field `{}`", field)))?;

    Ok(serde_json::from_value(field_value)?)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
