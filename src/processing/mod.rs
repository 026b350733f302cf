//! Template building logic.
//!
//! This module turns network plans into a template document:
//! - [`plans`] - Built-in Dev/Stage/Prod plans and plan files
//! - [`validate`] - CIDR and prefix checks run before building
//! - [`builder`] - The per-plan VPC topology

pub mod builder;
pub mod plans;
pub mod validate;

// Re-export public functions
pub use builder::{add_plan, build_document, LogicalIds, DEFAULT_ROUTE, RESOURCES_PER_PLAN};
pub use plans::{
    dev_plan, load_plans, multi_environment_plans, prod_plan, read_plan_file, stage_plan,
};
pub use validate::{validate_plan, validate_plans};
