//! Network plan data model.

use super::Ipv4;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subnet tier of the three-tier layout.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// No internet access.
    Private,
    /// Direct internet access through the internet gateway.
    Public,
    /// Outbound internet access through the NAT gateway.
    Protected,
}

impl Tier {
    /// All tiers, in declaration order.
    pub const ALL: [Tier; 3] = [Tier::Private, Tier::Public, Tier::Protected];

    /// Capitalised name used in logical ids and tags ("Private").
    pub fn label(self) -> &'static str {
        match self {
            Tier::Private => "Private",
            Tier::Public => "Public",
            Tier::Protected => "Protected",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One environment's address plan: a root block and two subnets per tier.
///
/// Subnet #1 of every tier lands in availability zone ordinal 0, subnet #2 in
/// ordinal 1.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlan {
    /// Environment name, e.g. "Dev".
    pub name: String,
    /// Prefix for every logical id of this plan, e.g. "Dev", "Stg".
    pub id_prefix: String,
    /// Root CIDR block of the VPC.
    pub network: Ipv4,
    /// Private subnet blocks.
    pub private: [Ipv4; 2],
    /// Public subnet blocks.
    pub public: [Ipv4; 2],
    /// Protected subnet blocks.
    pub protected: [Ipv4; 2],
    /// Cost-center tag value, if the environment carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
}

impl NetworkPlan {
    /// Subnet blocks of one tier.
    pub fn tier(&self, tier: Tier) -> &[Ipv4; 2] {
        match tier {
            Tier::Private => &self.private,
            Tier::Public => &self.public,
            Tier::Protected => &self.protected,
        }
    }

    /// Every subnet block as (tier, zero-based index, block).
    pub fn subnet_ranges(&self) -> impl Iterator<Item = (Tier, usize, Ipv4)> + '_ {
        Tier::ALL.into_iter().flat_map(move |tier| {
            self.tier(tier)
                .iter()
                .enumerate()
                .map(move |(i, cidr)| (tier, i, *cidr))
        })
    }

    /// Set the cost center unless the plan already has one.
    pub fn with_default_cost_center(mut self, cost_center: Option<&str>) -> NetworkPlan {
        if self.cost_center.is_none() {
            self.cost_center = cost_center.map(str::to_string);
        }
        self
    }
}

impl fmt::Display for NetworkPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.id_prefix, self.network)
    }
}
