//! Repository client for bill records.

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Bill, BillId},
    error::ApiError,
    protocol::UploadResponse,
};
use tracing::debug;
use url::Url;

use crate::error::StoreError;

/// Receipt file plus the uploader's email, sent as a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
    pub email: String,
}

/// How a controller's bill update ended.
#[derive(Debug)]
pub enum Persistence {
    Stored(Bill),
    Failed(String),
    /// No store configured.
    Skipped,
}

impl Persistence {
    pub fn is_failed(&self) -> bool {
        matches!(self, Persistence::Failed(_))
    }
}

/// Backend persistence for bills. Calls are never retried or deduplicated.
#[async_trait]
pub trait BillStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Bill>, StoreError>;
    async fn create(&self, payload: UploadPayload) -> Result<UploadResponse, StoreError>;
    async fn update(&self, id: &BillId, bill: &Bill) -> Result<Bill, StoreError>;
}

pub struct HttpBillStore {
    http: Client,
    base_url: Url,
    jwt: Option<String>,
}

impl HttpBillStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            jwt: None,
        })
    }

    pub fn with_token(mut self, jwt: Option<String>) -> Self {
        self.jwt = jwt.filter(|token| !token.trim().is_empty());
        self
    }

    fn bills_url(&self) -> Result<Url, StoreError> {
        Ok(self.base_url.join("bills")?)
    }

    fn bill_url(&self, id: &BillId) -> Result<Url, StoreError> {
        let mut url = self.bills_url()?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id.as_str());
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.jwt {
            Some(jwt) => request.bearer_auth(jwt),
            None => request,
        }
    }
}

#[async_trait]
impl BillStore for HttpBillStore {
    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        let url = self.bills_url()?;
        debug!(%url, "store: listing bills");
        let response = self.authorize(self.http.get(url)).send().await?;
        read_json(response).await
    }

    async fn create(&self, payload: UploadPayload) -> Result<UploadResponse, StoreError> {
        let url = self.bills_url()?;
        let mime_type = payload.mime_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&payload.file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });
        debug!(%url, file_name = %payload.file_name, %mime_type, "store: uploading receipt");

        let file = multipart::Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&mime_type)?;
        let form = multipart::Form::new()
            .part("file", file)
            .text("email", payload.email);

        let response = self
            .authorize(self.http.post(url))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update(&self, id: &BillId, bill: &Bill) -> Result<Bill, StoreError> {
        if id.is_unassigned() {
            return Err(StoreError::Unassigned);
        }
        let url = self.bill_url(id)?;
        debug!(%url, bill_id = %id, status = %bill.status, "store: updating bill");
        let response = self
            .authorize(self.http.patch(url))
            .json(bill)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ApiError>(&body)
            .ok()
            .map(|err| err.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("Erreur {}", status.as_u16()));
        return Err(StoreError::rejected(status.as_u16(), message));
    }

    serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
}
