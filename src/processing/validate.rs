//! Network plan validation.
//!
//! Rejects plans whose blocks CloudFormation would refuse or that would
//! collide, before any resource is declared.

use crate::error::ConfigurationError;
use crate::models::{cut_addr, Ipv4, NetworkPlan};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

/// Largest VPC or subnet block AWS accepts.
pub const MIN_BLOCK_MASK: u8 = 16;
/// Smallest VPC or subnet block AWS accepts.
pub const MAX_BLOCK_MASK: u8 = 28;

lazy_static! {
    // Leaves room for the longest suffix within the 255 character id limit.
    static ref ID_PREFIX: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9]{0,199}$").expect("Invalid Regex?");
}

fn check_block(plan: &NetworkPlan, cidr: &Ipv4) -> Result<(), ConfigurationError> {
    let network = cut_addr(cidr.addr, cidr.mask)?;
    if network != cidr.addr {
        return Err(ConfigurationError::HostBitsSet {
            plan: plan.name.clone(),
            cidr: cidr.to_string(),
            expected: cidr.network().to_string(),
        });
    }
    if !(MIN_BLOCK_MASK..=MAX_BLOCK_MASK).contains(&cidr.mask) {
        return Err(ConfigurationError::BlockSize {
            plan: plan.name.clone(),
            cidr: cidr.to_string(),
            min: MIN_BLOCK_MASK,
            max: MAX_BLOCK_MASK,
        });
    }
    Ok(())
}

/// Validate one plan: id prefix, block sizes, containment and overlap.
pub fn validate_plan(plan: &NetworkPlan) -> Result<(), ConfigurationError> {
    if !ID_PREFIX.is_match(&plan.id_prefix) {
        return Err(ConfigurationError::InvalidPrefix {
            plan: plan.name.clone(),
            prefix: plan.id_prefix.clone(),
        });
    }

    check_block(plan, &plan.network)?;
    for (tier, i, cidr) in plan.subnet_ranges() {
        check_block(plan, &cidr)?;
        if !plan.network.contains(&cidr) {
            return Err(ConfigurationError::RangeOutsideNetwork {
                plan: plan.name.clone(),
                range: format!("{tier} #{} {cidr}", i + 1),
                network: plan.network.to_string(),
            });
        }
    }

    let ranges: Vec<_> = plan.subnet_ranges().collect();
    if let Some(((t1, i1, c1), (t2, i2, c2))) = ranges
        .iter()
        .tuple_combinations()
        .find(|((_, _, a), (_, _, b))| a.overlaps(b))
    {
        return Err(ConfigurationError::OverlappingRanges {
            plan: plan.name.clone(),
            first: format!("{t1} #{} {c1}", i1 + 1),
            second: format!("{t2} #{} {c2}", i2 + 1),
        });
    }

    log::debug!("plan {plan} is valid");
    Ok(())
}

/// Validate every plan and make sure no two plans share an id prefix.
///
/// Prefixes are compared case-insensitively because some logical ids use the
/// prefix upper-cased (`DEVVPC`) or lower-cased (`devprivatesubnet1`).
pub fn validate_plans(plans: &[NetworkPlan]) -> Result<(), ConfigurationError> {
    for plan in plans {
        validate_plan(plan)?;
    }
    if let Some((a, b)) = plans
        .iter()
        .tuple_combinations()
        .find(|(a, b)| a.id_prefix.eq_ignore_ascii_case(&b.id_prefix))
    {
        return Err(ConfigurationError::DuplicatePrefix {
            prefix: b.id_prefix.clone(),
            first: a.name.clone(),
            second: b.name.clone(),
        });
    }
    Ok(())
}
