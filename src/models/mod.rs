//! Domain models for template generation.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Ipv4`] - CIDR block with containment and overlap checks
//! - [`NetworkPlan`] and [`Tier`] - one environment's address plan
//! - [`ResourceDeclaration`] and [`ResourceKind`] - CloudFormation resources
//! - [`Document`] - the ordered template

mod document;
mod ipv4;
mod plan;
pub mod resource;

// Re-export public types
pub use document::{Document, TemplateOutput};
pub use ipv4::{
    broadcast_addr, cut_addr, get_cidr_mask, num_aws_hosts, Ipv4, AWS_RESERVED_ADDRESSES,
    MAX_LENGTH,
};
pub use plan::{NetworkPlan, Tier};
pub use resource::{ResourceDeclaration, ResourceKind};
