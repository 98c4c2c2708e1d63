//! Client for the marketplace REST backend.
//!
//! Implements the trip, media and availability ports over:
//! - `PATCH /trips/{id}` with the full trip body
//! - `POST /services/{id}/availability` with `{bookingDate, peopleCount}`
//! - `POST /media` as multipart with a `profilePicture` field

use crate::http::{ensure_success, read_json, transport_error};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use waypoint_core::availability::{AvailabilityQuery, AvailabilityResponse, AvailabilityService};
use waypoint_core::config::ApiConfig;
use waypoint_core::trip::{MediaRepository, ServiceId, Trip, TripRepository, UploadFile};
use waypoint_core::{Result, WaypointError};

const UPLOAD_FIELD: &str = "profilePicture";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Clone)]
pub struct MarketplaceApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    timeout: Duration,
}

impl MarketplaceApiClient {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
            timeout,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.auth_token.clone(),
            config.timeout(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attaches the bearer token when one is configured.
    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn patch_request(&self, trip_id: &str, trip: &Trip) -> reqwest::RequestBuilder {
        self.auth_request(
            self.client
                .patch(self.url(&format!("trips/{trip_id}")))
                .json(trip)
                .timeout(self.timeout),
        )
    }

    fn availability_request(
        &self,
        service_id: &str,
        query: &AvailabilityQuery,
    ) -> reqwest::RequestBuilder {
        self.auth_request(
            self.client
                .post(self.url(&format!("services/{service_id}/availability")))
                .json(query)
                .timeout(self.timeout),
        )
    }
}

#[async_trait]
impl TripRepository for MarketplaceApiClient {
    async fn patch_trip(&self, trip_id: &str, trip: &Trip) -> Result<()> {
        const OPERATION: &str = "patch trip";
        tracing::debug!("[MarketplaceApi] PATCH trip {}", trip_id);

        let response = self
            .patch_request(trip_id, trip)
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;
        ensure_success(OPERATION, response).await?;
        Ok(())
    }
}

#[async_trait]
impl AvailabilityService for MarketplaceApiClient {
    async fn check(
        &self,
        service_id: &ServiceId,
        query: &AvailabilityQuery,
    ) -> Result<AvailabilityResponse> {
        const OPERATION: &str = "check availability";
        tracing::debug!(
            "[MarketplaceApi] Checking availability of {} on {}",
            service_id,
            query.booking_date
        );

        let response = self
            .availability_request(service_id, query)
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;
        let response = ensure_success(OPERATION, response).await?;
        read_json(OPERATION, response).await
    }
}

#[async_trait]
impl MediaRepository for MarketplaceApiClient {
    async fn upload(&self, file: UploadFile) -> Result<String> {
        const OPERATION: &str = "upload media";
        tracing::debug!(
            "[MarketplaceApi] Uploading {} ({} bytes)",
            file.file_name,
            file.bytes.len()
        );

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| WaypointError::validation(format!("invalid content type: {e}")))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let request = self.auth_request(
            self.client
                .post(self.url("media"))
                .multipart(form)
                .timeout(self.timeout),
        );
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;
        let response = ensure_success(OPERATION, response).await?;
        let body: UploadResponse = read_json(OPERATION, response).await?;
        Ok(body.url)
    }
}
