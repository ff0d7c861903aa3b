//! JSON:API wire types for the Scalr v3 API

use argsync_core::argument::{Argument, ArgumentPatch, ArgumentSpec};
use serde::{Deserialize, Serialize};

pub const PARAMETER_TYPE: &str = "provider-configuration-parameters";
pub const PROVIDER_CONFIGURATION_TYPE: &str = "provider-configurations";

/// Top-level JSON:API document
#[derive(Debug, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

impl<T> Document<T> {
    pub fn of(data: T) -> Self {
        Self { data }
    }
}

/// JSON:API resource object: `type` + optional `id` + attributes
#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceObject<A> {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: A,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterAttributes {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResourceObject<ParameterAttributes> {
    pub fn from_spec(spec: &ArgumentSpec) -> Self {
        Self {
            kind: PARAMETER_TYPE.to_string(),
            id: None,
            attributes: ParameterAttributes {
                key: spec.key.clone(),
                value: spec.value.clone(),
                sensitive: spec.sensitive,
                description: spec.description.clone(),
            },
        }
    }

    pub fn from_patch(patch: &ArgumentPatch) -> Self {
        Self {
            kind: PARAMETER_TYPE.to_string(),
            id: Some(patch.id.clone()),
            attributes: ParameterAttributes {
                key: patch.key.clone(),
                value: patch.value.clone(),
                sensitive: patch.sensitive,
                description: patch.description.clone(),
            },
        }
    }

    /// Convert a response object into the core argument model.
    /// The server always assigns an id; an absent one is kept empty.
    pub fn into_argument(self) -> Argument {
        Argument {
            id: self.id.unwrap_or_default(),
            key: self.attributes.key,
            value: self.attributes.value,
            sensitive: self.attributes.sensitive,
            description: self.attributes.description,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderConfigurationAttributes {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub export_shell_variables: bool,
    #[serde(default)]
    pub is_custom: bool,
}

/// Options for creating a provider configuration
#[derive(Debug, Clone, Default)]
pub struct ProviderConfigurationCreate {
    pub name: String,
    pub provider_name: String,
    pub export_shell_variables: bool,
}

impl ProviderConfigurationCreate {
    /// A custom (non-built-in) provider configuration
    pub fn custom(name: impl Into<String>, provider_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_name: provider_name.into(),
            export_shell_variables: false,
        }
    }
}

/// A provider configuration with its argument collection
#[derive(Debug, Clone, Default)]
pub struct ProviderConfiguration {
    pub id: String,
    pub name: String,
    pub provider_name: String,
    pub export_shell_variables: bool,
    pub is_custom: bool,
    pub parameters: Vec<Argument>,
}

impl ResourceObject<ProviderConfigurationAttributes> {
    pub fn from_create(options: &ProviderConfigurationCreate) -> Self {
        Self {
            kind: PROVIDER_CONFIGURATION_TYPE.to_string(),
            id: None,
            attributes: ProviderConfigurationAttributes {
                name: options.name.clone(),
                provider_name: Some(options.provider_name.clone()),
                export_shell_variables: options.export_shell_variables,
                is_custom: true,
            },
        }
    }

    pub fn into_configuration(self) -> ProviderConfiguration {
        ProviderConfiguration {
            id: self.id.unwrap_or_default(),
            name: self.attributes.name,
            provider_name: self.attributes.provider_name.unwrap_or_default(),
            export_shell_variables: self.attributes.export_shell_variables,
            is_custom: self.attributes.is_custom,
            parameters: Vec::new(),
        }
    }
}

/// JSON:API error document
#[derive(Debug, Deserialize)]
pub struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorDocument {
    /// Human-readable message built from the first error entry
    pub fn message(&self) -> Option<String> {
        self.errors
            .first()
            .and_then(|e| e.detail.clone().or_else(|| e.title.clone()))
    }
}
