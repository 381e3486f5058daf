//! Rendering of an [InstanceListing] in the supported output formats.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::listing::InstanceListing;

pub mod json;
pub mod sqltools;
pub mod txt;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("encoding JSON: `{0}`")]
    Json(#[from] serde_json::Error),
    #[error("formatting text: `{0}`")]
    Format(#[from] fmt::Error),
}

#[derive(Debug, Error, PartialEq)]
#[error("Output format must be JSON, SQLTools or Txt")]
pub struct UnknownOutputFormat(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    SqlTools,
    Txt,
}

impl FromStr for OutputFormat {
    type Err = UnknownOutputFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqltools" => Ok(Self::SqlTools),
            "txt" => Ok(Self::Txt),
            _ => Err(UnknownOutputFormat(value.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::SqlTools => write!(f, "SQLTools"),
            Self::Txt => write!(f, "Txt"),
        }
    }
}

/// Settings shared by the renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Name of the Service Manager instance the listing was read through.
    pub management_instance: String,
    pub show_credentials: bool,
}

pub trait Renderer {
    fn render(&self, listing: &InstanceListing) -> Result<String, RenderError>;
}

impl OutputFormat {
    pub fn renderer(&self, options: &RenderOptions) -> Box<dyn Renderer> {
        match self {
            Self::Json => Box::new(json::JsonRenderer::new(options.show_credentials)),
            Self::SqlTools => Box::new(sqltools::SqlToolsRenderer::new(
                options.management_instance.clone(),
            )),
            Self::Txt => Box::new(txt::TxtRenderer::new(options.show_credentials)),
        }
    }
}
