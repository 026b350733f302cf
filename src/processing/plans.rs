//! Built-in environment plans and plan file loading.

use crate::config::{Mode, Settings, DEFAULT_COST_CENTER};
use crate::error::ConfigurationError;
use crate::models::{Ipv4, NetworkPlan};
use std::path::Path;

// Dev VPC
const DEV_VPC_NETWORK: Ipv4 = Ipv4::from_octets([10, 0, 0, 0], 24);
const DEV_VPC_PRIVATE_1: Ipv4 = Ipv4::from_octets([10, 0, 0, 0], 27);
const DEV_VPC_PRIVATE_2: Ipv4 = Ipv4::from_octets([10, 0, 0, 32], 27);
const DEV_VPC_PUBLIC_1: Ipv4 = Ipv4::from_octets([10, 0, 0, 64], 27);
const DEV_VPC_PUBLIC_2: Ipv4 = Ipv4::from_octets([10, 0, 0, 96], 27);
const DEV_VPC_PROTECTED_1: Ipv4 = Ipv4::from_octets([10, 0, 0, 128], 27);
const DEV_VPC_PROTECTED_2: Ipv4 = Ipv4::from_octets([10, 0, 0, 160], 27);

// Stage VPC
const STG_VPC_NETWORK: Ipv4 = Ipv4::from_octets([10, 1, 0, 0], 20);
const STG_VPC_PRIVATE_1: Ipv4 = Ipv4::from_octets([10, 1, 0, 0], 23);
const STG_VPC_PRIVATE_2: Ipv4 = Ipv4::from_octets([10, 1, 2, 0], 23);
const STG_VPC_PUBLIC_1: Ipv4 = Ipv4::from_octets([10, 1, 4, 0], 23);
const STG_VPC_PUBLIC_2: Ipv4 = Ipv4::from_octets([10, 1, 6, 0], 23);
const STG_VPC_PROTECTED_1: Ipv4 = Ipv4::from_octets([10, 1, 8, 0], 23);
const STG_VPC_PROTECTED_2: Ipv4 = Ipv4::from_octets([10, 1, 10, 0], 23);

// Prod VPC
const PROD_VPC_NETWORK: Ipv4 = Ipv4::from_octets([10, 2, 0, 0], 16);
const PROD_VPC_PRIVATE_1: Ipv4 = Ipv4::from_octets([10, 2, 0, 0], 19);
const PROD_VPC_PRIVATE_2: Ipv4 = Ipv4::from_octets([10, 2, 32, 0], 19);
const PROD_VPC_PUBLIC_1: Ipv4 = Ipv4::from_octets([10, 2, 64, 0], 19);
const PROD_VPC_PUBLIC_2: Ipv4 = Ipv4::from_octets([10, 2, 96, 0], 19);
const PROD_VPC_PROTECTED_1: Ipv4 = Ipv4::from_octets([10, 2, 128, 0], 19);
const PROD_VPC_PROTECTED_2: Ipv4 = Ipv4::from_octets([10, 2, 160, 0], 19);

/// Dev environment, `10.0.0.0/24` split into /27 subnets.
pub fn dev_plan() -> NetworkPlan {
    NetworkPlan {
        name: "Dev".to_string(),
        id_prefix: "Dev".to_string(),
        network: DEV_VPC_NETWORK,
        private: [DEV_VPC_PRIVATE_1, DEV_VPC_PRIVATE_2],
        public: [DEV_VPC_PUBLIC_1, DEV_VPC_PUBLIC_2],
        protected: [DEV_VPC_PROTECTED_1, DEV_VPC_PROTECTED_2],
        cost_center: None,
    }
}

/// Stage environment, `10.1.0.0/20` split into /23 subnets.
pub fn stage_plan() -> NetworkPlan {
    NetworkPlan {
        name: "Stage".to_string(),
        id_prefix: "Stg".to_string(),
        network: STG_VPC_NETWORK,
        private: [STG_VPC_PRIVATE_1, STG_VPC_PRIVATE_2],
        public: [STG_VPC_PUBLIC_1, STG_VPC_PUBLIC_2],
        protected: [STG_VPC_PROTECTED_1, STG_VPC_PROTECTED_2],
        cost_center: None,
    }
}

/// Prod environment, `10.2.0.0/16` split into /19 subnets.
pub fn prod_plan() -> NetworkPlan {
    NetworkPlan {
        name: "Prod".to_string(),
        id_prefix: "Prod".to_string(),
        network: PROD_VPC_NETWORK,
        private: [PROD_VPC_PRIVATE_1, PROD_VPC_PRIVATE_2],
        public: [PROD_VPC_PUBLIC_1, PROD_VPC_PUBLIC_2],
        protected: [PROD_VPC_PROTECTED_1, PROD_VPC_PROTECTED_2],
        cost_center: None,
    }
}

/// Dev, Stage and Prod, each tagged with the cost center.
///
/// # Arguments
/// * `cost_center` - Cost center to tag. If None, uses [`DEFAULT_COST_CENTER`].
pub fn multi_environment_plans(cost_center: Option<&str>) -> Vec<NetworkPlan> {
    let cost_center = cost_center.unwrap_or(DEFAULT_COST_CENTER);
    vec![dev_plan(), stage_plan(), prod_plan()]
        .into_iter()
        .map(|p| p.with_default_cost_center(Some(cost_center)))
        .collect()
}

/// Read a JSON array of plans from `path`.
///
/// Parse errors carry the JSON path of the offending field.
pub fn read_plan_file(path: &Path) -> Result<Vec<NetworkPlan>, ConfigurationError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigurationError::PlanFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Reading plans from file: {}", path.display());

    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let plans: Vec<NetworkPlan> =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            ConfigurationError::PlanFileParse {
                path: path.to_path_buf(),
                at: e.path().to_string(),
                message: e.inner().to_string(),
            }
        })?;

    log::info!("Read {} plan(s) from {}", plans.len(), path.display());
    Ok(plans)
}

/// Resolve the plans to render from the settings.
///
/// A plan file wins over the mode. The configured cost center applies to
/// plan file entries without one and to the built-in multi plans; the single
/// Dev plan is never tagged with one.
pub fn load_plans(settings: &Settings) -> Result<Vec<NetworkPlan>, ConfigurationError> {
    let cost_center = settings.cost_center.as_deref();
    let plans = match (&settings.plans_file, settings.mode) {
        (Some(path), _) => read_plan_file(path)?
            .into_iter()
            .map(|p| p.with_default_cost_center(cost_center))
            .collect(),
        (None, Mode::Multi) => multi_environment_plans(cost_center),
        (None, Mode::Single) => vec![dev_plan()],
    };
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_dev_plan_matches_reference_ranges() {
        let plan = dev_plan();
        let ranges: Vec<String> = plan.subnet_ranges().map(|(_, _, c)| c.to_string()).collect();
        assert_eq!(plan.network.to_string(), "10.0.0.0/24");
        assert_eq!(
            ranges,
            vec![
                "10.0.0.0/27",
                "10.0.0.32/27",
                "10.0.0.64/27",
                "10.0.0.96/27",
                "10.0.0.128/27",
                "10.0.0.160/27"
            ]
        );
    }

    #[test]
    fn test_builtin_ranges_disjoint_and_contained() {
        for plan in multi_environment_plans(None) {
            let ranges: Vec<Ipv4> = plan.subnet_ranges().map(|(_, _, c)| c).collect();
            for (i, a) in ranges.iter().enumerate() {
                assert!(plan.network.contains(a), "{} not in {}", a, plan.network);
                for b in &ranges[i + 1..] {
                    assert!(!a.overlaps(b), "{a} overlaps {b} in {}", plan.name);
                }
            }
        }
    }

    #[test]
    fn test_multi_environment_plans() {
        let plans = multi_environment_plans(None);
        let prefixes: Vec<&str> = plans.iter().map(|p| p.id_prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["Dev", "Stg", "Prod"]);
        assert!(plans
            .iter()
            .all(|p| p.cost_center.as_deref() == Some(DEFAULT_COST_CENTER)));

        let plans = multi_environment_plans(Some("CC-7"));
        assert_eq!(plans[2].cost_center.as_deref(), Some("CC-7"));
    }

    #[test]
    fn test_load_plans_single_default() {
        let plans = load_plans(&Settings::default()).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0], dev_plan());
    }

    #[test]
    fn test_load_plans_single_ignores_cost_center() {
        let settings = Settings {
            mode: Mode::Single,
            cost_center: Some("CC-X".to_string()),
            ..Default::default()
        };
        let plans = load_plans(&settings).unwrap();
        assert_eq!(plans, vec![dev_plan()]);
        assert_eq!(plans[0].cost_center, None);

        let settings = Settings {
            mode: Mode::Multi,
            ..settings
        };
        let plans = load_plans(&settings).unwrap();
        assert!(plans.iter().all(|p| p.cost_center.as_deref() == Some("CC-X")));
    }

    #[test]
    fn test_load_plans_from_file() {
        let settings = Settings {
            mode: Mode::Single,
            plans_file: Some(PathBuf::from("src/tests/test_data/plans_two_envs.json")),
            cost_center: Some("CC-FILE".to_string()),
            ..Default::default()
        };
        let plans = load_plans(&settings).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].id_prefix, "Qa");
        assert_eq!(plans[0].cost_center.as_deref(), Some("QA-100"));
        assert_eq!(plans[1].id_prefix, "Perf");
        assert_eq!(plans[1].cost_center.as_deref(), Some("CC-FILE"));
    }

    #[test]
    fn test_read_plan_file_missing() {
        let err = read_plan_file(Path::new("src/tests/test_data/no_such_file.json")).unwrap_err();
        assert!(matches!(err, ConfigurationError::PlanFileRead { .. }));
    }

    #[test]
    fn test_read_plan_file_reports_path() {
        let err = read_plan_file(Path::new("src/tests/test_data/plans_bad_cidr.json")).unwrap_err();
        match err {
            ConfigurationError::PlanFileParse { at, message, .. } => {
                assert!(at.starts_with("[0].public"), "{at}");
                assert!(message.contains("10.5.0.96"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
