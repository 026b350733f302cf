//! Three-tier VPC topology builder.
//!
//! Declares, per plan, one VPC with private, public and protected subnet pairs,
//! the internet gateway, the NAT gateway and their route tables.

use crate::config::{TEMPLATE_DESCRIPTION, TEMPLATE_FORMAT_VERSION};
use crate::error::{BuildError, Result};
use crate::models::resource::{get_att, reference, select_az, STACK_ID};
use crate::models::{
    num_aws_hosts, Document, NetworkPlan, ResourceDeclaration, ResourceKind, TemplateOutput, Tier,
};
use crate::processing::validate::validate_plans;
use serde_json::{json, Value};

/// Destination of the default routes.
pub const DEFAULT_ROUTE: &str = "0.0.0.0/0";

/// Resources declared for every plan.
pub const RESOURCES_PER_PLAN: usize = 22;

/// Logical ids and `Name` tags derived from a plan's id prefix.
///
/// Casing follows the long-standing stack layout: the VPC id is upper-cased
/// (`DEVVPC`), subnet ids are lower-cased (`devprivatesubnet1`), everything
/// else keeps the prefix as written (`DevPrivateRouteTable`). Subnet numbers
/// are 1-based.
#[derive(Debug, Clone)]
pub struct LogicalIds<'a> {
    prefix: &'a str,
}

impl<'a> LogicalIds<'a> {
    pub fn new(prefix: &'a str) -> Self {
        LogicalIds { prefix }
    }

    pub fn vpc(&self) -> String {
        format!("{}VPC", self.prefix.to_uppercase())
    }

    pub fn vpc_tag(&self) -> String {
        format!("{}_VPC", self.prefix.to_uppercase())
    }

    pub fn route_table(&self, tier: Tier) -> String {
        format!("{}{}RouteTable", self.prefix, tier.label())
    }

    pub fn route_table_tag(&self, tier: Tier) -> String {
        format!("{}_{}_Route_Table", self.prefix, tier.label())
    }

    pub fn subnet(&self, tier: Tier, n: usize) -> String {
        format!(
            "{}{}subnet{n}",
            self.prefix.to_lowercase(),
            tier.label().to_lowercase()
        )
    }

    pub fn subnet_tag(&self, tier: Tier, n: usize) -> String {
        format!("{}_{}_Subnet_{n}", self.prefix, tier.label())
    }

    pub fn association(&self, tier: Tier, n: usize) -> String {
        format!("{}{}Subnet{n}RouteTable", self.prefix, tier.label())
    }

    pub fn internet_gateway(&self) -> String {
        format!("{}InternetGateway", self.prefix)
    }

    pub fn internet_gateway_tag(&self) -> String {
        format!("{}_IGW", self.prefix)
    }

    pub fn gateway_attachment(&self) -> String {
        format!("{}InternetGatewayAttachment", self.prefix)
    }

    pub fn internet_route(&self) -> String {
        format!("{}RouteToInternet", self.prefix)
    }

    pub fn nat_eip(&self) -> String {
        format!("{}NatEip", self.prefix)
    }

    pub fn nat_eip_tag(&self) -> String {
        format!("{}_NAT_EIP", self.prefix)
    }

    pub fn nat_gateway(&self) -> String {
        format!("{}Nat", self.prefix)
    }

    pub fn nat_gateway_tag(&self) -> String {
        format!("{}_NAT", self.prefix)
    }

    pub fn nat_route(&self) -> String {
        format!("{}NatRoute", self.prefix)
    }

    pub fn vpc_output(&self) -> String {
        format!("{}VpcId", self.prefix)
    }

    pub fn subnets_output(&self, tier: Tier) -> String {
        format!("{}{}SubnetIds", self.prefix, tier.label())
    }
}

/// Tags for a taggable resource of `plan`.
fn tags(plan: &NetworkPlan, name: String) -> Vec<(&'static str, Value)> {
    let mut tags = vec![
        ("Name", Value::from(name)),
        ("Application", reference(STACK_ID)),
    ];
    if let Some(cost_center) = &plan.cost_center {
        tags.push(("CostCenter", Value::from(cost_center.as_str())));
    }
    tags
}

/// Route table plus its two subnets and their associations.
fn add_tier(
    doc: &mut Document,
    plan: &NetworkPlan,
    ids: &LogicalIds,
    tier: Tier,
    routes: impl FnOnce(&mut Document, &str) -> std::result::Result<(), BuildError>,
) -> std::result::Result<(), BuildError> {
    let vpc = ids.vpc();
    let route_table = ids.route_table(tier);
    doc.add(
        ResourceDeclaration::new(&route_table, ResourceKind::RouteTable)
            .property("VpcId", reference(&vpc))
            .tags(&tags(plan, ids.route_table_tag(tier))),
    )?;
    routes(doc, &route_table)?;

    for (i, cidr) in plan.tier(tier).iter().enumerate() {
        let n = i + 1;
        let subnet = ids.subnet(tier, n);
        if let Ok(hosts) = num_aws_hosts(cidr.mask) {
            log::debug!("{subnet} {cidr} az#{i} usable hosts={hosts}");
        }
        doc.add(
            ResourceDeclaration::new(&subnet, ResourceKind::Subnet)
                .property("AvailabilityZone", select_az(i))
                .property("CidrBlock", cidr.to_string())
                .property("VpcId", reference(&vpc))
                .tags(&tags(plan, ids.subnet_tag(tier, n))),
        )?;
        doc.add(
            ResourceDeclaration::new(
                ids.association(tier, n),
                ResourceKind::SubnetRouteTableAssociation,
            )
            .property("RouteTableId", reference(&route_table))
            .property("SubnetId", reference(&subnet)),
        )?;
    }
    Ok(())
}

/// Declare the full topology of one plan into `doc`.
///
/// Returns the number of resources added.
pub fn add_plan(doc: &mut Document, plan: &NetworkPlan) -> std::result::Result<usize, BuildError> {
    let ids = LogicalIds::new(&plan.id_prefix);
    let start = doc.len();
    let vpc = ids.vpc();

    doc.add(
        ResourceDeclaration::new(&vpc, ResourceKind::Vpc)
            .property("CidrBlock", plan.network.to_string())
            .property("InstanceTenancy", "default")
            .property("EnableDnsSupport", true)
            .tags(&tags(plan, ids.vpc_tag())),
    )?;

    // Private: no route out.
    add_tier(doc, plan, &ids, Tier::Private, |_, _| Ok(()))?;

    let igw = ids.internet_gateway();
    let attachment = ids.gateway_attachment();
    doc.add(
        ResourceDeclaration::new(&igw, ResourceKind::InternetGateway)
            .tags(&tags(plan, ids.internet_gateway_tag())),
    )?;
    doc.add(
        ResourceDeclaration::new(&attachment, ResourceKind::VpcGatewayAttachment)
            .property("InternetGatewayId", reference(&igw))
            .property("VpcId", reference(&vpc)),
    )?;

    // Public: default route through the internet gateway, once it is attached.
    add_tier(doc, plan, &ids, Tier::Public, |doc, route_table| {
        doc.add(
            ResourceDeclaration::new(ids.internet_route(), ResourceKind::Route)
                .property("DestinationCidrBlock", DEFAULT_ROUTE)
                .property("GatewayId", reference(&igw))
                .property("RouteTableId", reference(route_table))
                .depends_on(&attachment),
        )?;
        Ok(())
    })?;

    let eip = ids.nat_eip();
    let nat = ids.nat_gateway();
    doc.add(
        ResourceDeclaration::new(&eip, ResourceKind::Eip)
            .property("Domain", "vpc")
            .tags(&tags(plan, ids.nat_eip_tag())),
    )?;
    doc.add(
        ResourceDeclaration::new(&nat, ResourceKind::NatGateway)
            .property("AllocationId", get_att(&eip, "AllocationId"))
            .property("SubnetId", reference(&ids.subnet(Tier::Public, 1)))
            .tags(&tags(plan, ids.nat_gateway_tag())),
    )?;

    // Protected: default route through the NAT gateway.
    add_tier(doc, plan, &ids, Tier::Protected, |doc, route_table| {
        doc.add(
            ResourceDeclaration::new(ids.nat_route(), ResourceKind::Route)
                .property("RouteTableId", reference(route_table))
                .property("DestinationCidrBlock", DEFAULT_ROUTE)
                .property("NatGatewayId", reference(&nat)),
        )?;
        Ok(())
    })?;

    add_plan_outputs(doc, plan, &ids)?;

    let added = doc.len() - start;
    log::info!("Declared {added} resources for plan {plan}");
    Ok(added)
}

/// Export the VPC id and each tier's subnet ids.
fn add_plan_outputs(
    doc: &mut Document,
    plan: &NetworkPlan,
    ids: &LogicalIds,
) -> std::result::Result<(), BuildError> {
    let export =
        |name: &str| json!({ "Name": { "Fn::Sub": format!("${{AWS::StackName}}-{name}") } });

    let name = ids.vpc_output();
    doc.add_output(TemplateOutput {
        description: format!("{} VPC id", plan.name),
        value: reference(&ids.vpc()),
        export: Some(export(&name)),
        name,
    })?;

    for tier in Tier::ALL {
        let name = ids.subnets_output(tier);
        let subnets: Vec<Value> = (1..=2).map(|n| reference(&ids.subnet(tier, n))).collect();
        doc.add_output(TemplateOutput {
            description: format!("{} {} subnet ids", plan.name, tier.label().to_lowercase()),
            value: json!({ "Fn::Join": [",", subnets] }),
            export: Some(export(&name)),
            name,
        })?;
    }
    Ok(())
}

/// Validate `plans` and render them into a single document.
///
/// Nothing is built when any plan is invalid, and the finished document is
/// checked for references to undeclared logical ids.
pub fn build_document(plans: &[NetworkPlan]) -> Result<Document> {
    validate_plans(plans)?;

    let mut doc = Document::new(TEMPLATE_FORMAT_VERSION, TEMPLATE_DESCRIPTION);
    if plans.is_empty() {
        log::warn!("No network plans given, the template has no resources");
    }
    for plan in plans {
        add_plan(&mut doc, plan)?;
    }
    doc.verify_references()?;

    log::info!(
        "Built template with {} resources for {} plan(s)",
        doc.len(),
        plans.len()
    );
    Ok(doc)
}
