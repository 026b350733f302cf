//! CloudFormation template generator for a three-tier VPC layout.
//!
//! Each network plan becomes one VPC with private, public and protected
//! subnet pairs spread over two availability zones.
//!
//! # Modules
//! - [`config`] - Settings and template constants
//! - [`error`] - Error types
//! - [`logging`] - log4rs setup
//! - [`models`] - CIDR blocks, plans, resources and the template document
//! - [`processing`] - Plan loading, validation and the topology builder
//! - [`output`] - JSON rendering

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod processing;

use config::Settings;
use models::Document;

pub use error::{BuildError, ConfigurationError, Error, Result};

/// Load the plans the settings select and build their template.
pub fn build_template(settings: &Settings) -> Result<Document> {
    let plans = processing::load_plans(settings)?;
    log::info!(
        "Building template for plan(s): {}",
        plans
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ")
    );
    processing::build_document(&plans)
}

/// Build the template and render it as JSON.
pub fn render_template(settings: &Settings) -> Result<String> {
    let doc = build_template(settings)?;
    output::render_document(&doc, settings.pretty)
}
