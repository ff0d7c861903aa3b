//! Scalr API client
//!
//! Thin reqwest wrapper over the handful of `/api/iacp/v3` endpoints the
//! reconciler needs: provider configurations and their parameters.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use argsync_core::argument::{Argument, ArgumentPatch, ArgumentSpec, DesiredSet};
use argsync_core::reconciler::Reconciler;
use argsync_core::store::{ParameterStore, StoreError, StoreResult};

use crate::error::ScalrError;
use crate::types::{
    Document, ErrorDocument, ParameterAttributes, ProviderConfiguration,
    ProviderConfigurationAttributes, ProviderConfigurationCreate, ResourceObject,
};

const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

#[derive(Debug, Clone)]
pub struct ScalrClient {
    client: reqwest::Client,
    base_url: String,
}

impl ScalrClient {
    /// Connect to a Scalr installation by hostname (e.g. `acme.scalr.io`).
    pub fn new(hostname: &str, token: &str) -> Result<Self, ScalrError> {
        Self::with_base_url(format!("https://{hostname}/api/iacp/v3"), token)
    }

    /// NOTE: Primarily used for testing with mock servers.
    pub fn with_base_url(base_url: impl Into<String>, token: &str) -> Result<Self, ScalrError> {
        let mut headers = HeaderMap::new();
        let auth_value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ScalrError::Auth("invalid token format".to_string()))?;
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API_CONTENT_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API_CONTENT_TYPE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ScalrError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    /// Read a provider configuration together with its arguments.
    pub async fn read_provider_configuration(
        &self,
        id: &str,
    ) -> Result<ProviderConfiguration, ScalrError> {
        let url = format!("{}/provider-configurations/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let response = self.check(response).await?;

        let document: Document<ResourceObject<ProviderConfigurationAttributes>> =
            response.json().await?;
        let mut configuration = document.data.into_configuration();
        configuration.parameters = self.fetch_parameters(id).await?;
        Ok(configuration)
    }

    pub async fn create_provider_configuration(
        &self,
        options: &ProviderConfigurationCreate,
    ) -> Result<ProviderConfiguration, ScalrError> {
        let url = format!("{}/provider-configurations", self.base_url);
        let body = Document::of(ResourceObject::from_create(options));

        let response = self.client.post(&url).json(&body).send().await?;
        let response = self.check(response).await?;

        let document: Document<ResourceObject<ProviderConfigurationAttributes>> =
            response.json().await?;
        tracing::info!(name = %options.name, "provider configuration created");
        Ok(document.data.into_configuration())
    }

    pub async fn delete_provider_configuration(&self, id: &str) -> Result<(), ScalrError> {
        let url = format!("{}/provider-configurations/{id}", self.base_url);
        let response = self.client.delete(&url).send().await?;
        self.check(response).await?;
        tracing::info!(config_id = %id, "provider configuration deleted");
        Ok(())
    }

    /// Create a provider configuration and its initial arguments.
    ///
    /// If any argument fails to create, the just-created configuration is
    /// deleted again so no half-configured parent is left behind. A failed
    /// cleanup is reported distinctly ([`ScalrError::RollbackFailed`])
    /// rather than swallowed.
    pub async fn create_with_arguments(
        self: Arc<Self>,
        options: &ProviderConfigurationCreate,
        desired: &DesiredSet,
    ) -> Result<ProviderConfiguration, ScalrError> {
        let mut configuration = self.create_provider_configuration(options).await?;
        if desired.is_empty() {
            return Ok(configuration);
        }

        let reconciler = Reconciler::new(Arc::clone(&self));
        match reconciler.sync(&configuration.id, desired).await {
            Ok(outcome) => {
                configuration.parameters = outcome.created;
                Ok(configuration)
            }
            Err(source) => {
                tracing::error!(
                    config_id = %configuration.id,
                    error = %source,
                    "argument sync failed, deleting provider configuration"
                );
                match self.delete_provider_configuration(&configuration.id).await {
                    Ok(()) => Err(ScalrError::RolledBack {
                        id: configuration.id,
                        source,
                    }),
                    Err(cleanup) => {
                        tracing::error!(
                            config_id = %configuration.id,
                            error = %cleanup,
                            "cleanup of provider configuration failed"
                        );
                        Err(ScalrError::RollbackFailed {
                            id: configuration.id,
                            source,
                            cleanup: Box::new(cleanup),
                        })
                    }
                }
            }
        }
    }

    async fn fetch_parameters(&self, config_id: &str) -> Result<Vec<Argument>, ScalrError> {
        let url = format!(
            "{}/provider-configurations/{config_id}/parameters",
            self.base_url
        );
        let response = self.client.get(&url).send().await?;
        let response = self.check(response).await?;

        let document: Document<Vec<ResourceObject<ParameterAttributes>>> =
            response.json().await?;
        Ok(document
            .data
            .into_iter()
            .map(ResourceObject::into_argument)
            .collect())
    }

    /// Map non-success statuses to errors, extracting the JSON:API error
    /// document when the server sent one.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, ScalrError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let fallback = status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
        let message = response
            .json::<ErrorDocument>()
            .await
            .ok()
            .and_then(|document| document.message())
            .unwrap_or(fallback);

        Err(match status {
            StatusCode::NOT_FOUND => ScalrError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ScalrError::Auth(message),
            _ => ScalrError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl ParameterStore for ScalrClient {
    async fn list_parameters(&self, config_id: &str) -> StoreResult<Vec<Argument>> {
        self.fetch_parameters(config_id)
            .await
            .map_err(StoreError::from)
    }

    async fn create_parameter(
        &self,
        config_id: &str,
        spec: &ArgumentSpec,
    ) -> StoreResult<Argument> {
        let url = format!(
            "{}/provider-configurations/{config_id}/parameters",
            self.base_url
        );
        let body = Document::of(ResourceObject::from_spec(spec));

        let result: Result<Argument, ScalrError> = async {
            let response = self.client.post(&url).json(&body).send().await?;
            let response = self.check(response).await?;
            let document: Document<ResourceObject<ParameterAttributes>> =
                response.json().await?;
            Ok(document.data.into_argument())
        }
        .await;

        tracing::debug!(config_id = %config_id, key = %spec.key, ok = result.is_ok(), "create parameter");
        result.map_err(StoreError::from)
    }

    async fn update_parameter(&self, patch: &ArgumentPatch) -> StoreResult<Argument> {
        let url = format!(
            "{}/provider-configuration-parameters/{}",
            self.base_url, patch.id
        );
        let body = Document::of(ResourceObject::from_patch(patch));

        let result: Result<Argument, ScalrError> = async {
            let response = self.client.patch(&url).json(&body).send().await?;
            let response = self.check(response).await?;
            let document: Document<ResourceObject<ParameterAttributes>> =
                response.json().await?;
            Ok(document.data.into_argument())
        }
        .await;

        tracing::debug!(id = %patch.id, key = %patch.key, ok = result.is_ok(), "update parameter");
        result.map_err(StoreError::from)
    }

    async fn delete_parameter(&self, id: &str) -> StoreResult<()> {
        let url = format!("{}/provider-configuration-parameters/{id}", self.base_url);

        let result: Result<(), ScalrError> = async {
            let response = self.client.delete(&url).send().await?;
            self.check(response).await?;
            Ok(())
        }
        .await;

        tracing::debug!(id = %id, ok = result.is_ok(), "delete parameter");
        result.map_err(StoreError::from)
    }
}
