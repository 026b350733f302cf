//! Template document: ordered resources plus template metadata.

use super::resource::{collect_references, ResourceDeclaration, ResourceKind};
use crate::error::BuildError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;

lazy_static! {
    static ref LOGICAL_ID: Regex = Regex::new(r"^[A-Za-z0-9]{1,255}$").expect("Invalid Regex?");
}

/// Entry of the `Outputs` section.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TemplateOutput {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Value")]
    pub value: Value,
    #[serde(rename = "Export", skip_serializing_if = "Option::is_none")]
    pub export: Option<Value>,
}

impl TemplateOutput {
    /// Logical ids named by the output value.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_references(&self.value, &mut out);
        out
    }
}

/// A rendered CloudFormation template.
///
/// Resources keep insertion order; logical ids are unique across the whole
/// document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub format_version: String,
    pub description: String,
    resources: Vec<ResourceDeclaration>,
    outputs: Vec<TemplateOutput>,
    ids: HashSet<String>,
}

impl Document {
    pub fn new(format_version: &str, description: &str) -> Document {
        Document {
            format_version: format_version.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Append a resource, rejecting malformed or repeated logical ids.
    pub fn add(
        &mut self,
        resource: ResourceDeclaration,
    ) -> Result<&ResourceDeclaration, BuildError> {
        if !LOGICAL_ID.is_match(&resource.logical_id) {
            return Err(BuildError::InvalidLogicalId(resource.logical_id));
        }
        if !self.ids.insert(resource.logical_id.clone()) {
            return Err(BuildError::DuplicateLogicalId(resource.logical_id));
        }
        log::trace!("add {} {}", resource.kind, resource.logical_id);
        self.resources.push(resource);
        let last = self.resources.len() - 1;
        Ok(&self.resources[last])
    }

    /// Append an output. Output names share the logical id rules.
    pub fn add_output(&mut self, output: TemplateOutput) -> Result<(), BuildError> {
        if !LOGICAL_ID.is_match(&output.name) {
            return Err(BuildError::InvalidLogicalId(output.name));
        }
        if self.outputs.iter().any(|o| o.name == output.name) {
            return Err(BuildError::DuplicateLogicalId(output.name));
        }
        self.outputs.push(output);
        Ok(())
    }

    pub fn resources(&self) -> &[ResourceDeclaration] {
        &self.resources
    }

    pub fn outputs(&self) -> &[TemplateOutput] {
        &self.outputs
    }

    pub fn get(&self, logical_id: &str) -> Option<&ResourceDeclaration> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.ids.contains(logical_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources of one kind, in document order.
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceDeclaration> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    /// Check that every `Ref`, `Fn::GetAtt` and `DependsOn` target exists.
    ///
    /// Pseudo parameters (`AWS::...`) are not resources and are skipped.
    pub fn verify_references(&self) -> Result<(), BuildError> {
        let outputs = self
            .outputs
            .iter()
            .map(|o| (o.name.as_str(), o.references()));
        let resources = self
            .resources
            .iter()
            .map(|r| (r.logical_id.as_str(), r.references()));

        for (from, refs) in resources.chain(outputs) {
            if let Some(to) = refs
                .into_iter()
                .find(|id| !id.starts_with("AWS::") && !self.contains(id))
            {
                return Err(BuildError::DanglingReference {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Serializes a slice as a map keyed by each entry's logical id.
struct Entries<'a, T>(&'a [T], fn(&T) -> &str);

fn resource_key(r: &ResourceDeclaration) -> &str {
    &r.logical_id
}

fn output_key(o: &TemplateOutput) -> &str {
    &o.name
}

impl<T: Serialize> Serialize for Entries<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry((self.1)(entry), entry)?;
        }
        map.end()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.outputs.is_empty() { 3 } else { 4 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("AWSTemplateFormatVersion", &self.format_version)?;
        map.serialize_entry("Description", &self.description)?;
        map.serialize_entry("Resources", &Entries(&self.resources, resource_key))?;
        if !self.outputs.is_empty() {
            map.serialize_entry("Outputs", &Entries(&self.outputs, output_key))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resource::{get_att, reference};
    use serde_json::json;

    fn doc() -> Document {
        Document::new("2010-09-09", "test")
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut d = doc();
        d.add(ResourceDeclaration::new("DEVVPC", ResourceKind::Vpc))
            .unwrap();
        let err = d
            .add(ResourceDeclaration::new("DEVVPC", ResourceKind::Vpc))
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateLogicalId(id) if id == "DEVVPC"));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_add_rejects_invalid_ids() {
        let mut d = doc();
        for id in ["", "Dev_VPC", "Dev-VPC", "Dev VPC"] {
            let err = d
                .add(ResourceDeclaration::new(id, ResourceKind::Vpc))
                .unwrap_err();
            assert!(matches!(err, BuildError::InvalidLogicalId(_)), "{id}");
        }
        assert!(d.is_empty());
    }

    #[test]
    fn test_verify_references() {
        let mut d = doc();
        d.add(ResourceDeclaration::new("DEVVPC", ResourceKind::Vpc))
            .unwrap();
        d.add(
            ResourceDeclaration::new("DevPrivateRouteTable", ResourceKind::RouteTable)
                .property("VpcId", reference("DEVVPC"))
                .tags(&[("Application", reference("AWS::StackId"))]),
        )
        .unwrap();
        assert!(d.verify_references().is_ok());

        d.add(
            ResourceDeclaration::new("DevNat", ResourceKind::NatGateway)
                .property("AllocationId", get_att("DevNatEip", "AllocationId")),
        )
        .unwrap();
        let err = d.verify_references().unwrap_err();
        assert!(matches!(
            err,
            BuildError::DanglingReference { ref from, ref to }
                if from == "DevNat" && to == "DevNatEip"
        ));
    }

    #[test]
    fn test_verify_depends_on() {
        let mut d = doc();
        d.add(
            ResourceDeclaration::new("DevRouteToInternet", ResourceKind::Route)
                .depends_on("DevInternetGatewayAttachment"),
        )
        .unwrap();
        assert!(matches!(
            d.verify_references(),
            Err(BuildError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_outputs() {
        let mut d = doc();
        d.add(ResourceDeclaration::new("DEVVPC", ResourceKind::Vpc))
            .unwrap();
        let output = TemplateOutput {
            name: "DevVpcId".to_string(),
            description: "VPC id".to_string(),
            value: reference("DEVVPC"),
            export: None,
        };
        d.add_output(output.clone()).unwrap();
        assert!(matches!(
            d.add_output(output),
            Err(BuildError::DuplicateLogicalId(_))
        ));
        d.add_output(TemplateOutput {
            name: "DevMissing".to_string(),
            description: String::new(),
            value: reference("Missing"),
            export: None,
        }).unwrap();
        assert!(d.verify_references().is_err());
    }

    #[test]
    fn test_serialize_keeps_order() {
        let mut d = doc();
        d.add(ResourceDeclaration::new("ZFirst", ResourceKind::Vpc))
            .unwrap();
        d.add(ResourceDeclaration::new("ASecond", ResourceKind::InternetGateway))
            .unwrap();
        let text = serde_json::to_string(&d).unwrap();
        assert_eq!(
            text,
            r#"{"AWSTemplateFormatVersion":"2010-09-09","Description":"test","Resources":{"ZFirst":{"Type":"AWS::EC2::VPC","Properties":{}},"ASecond":{"Type":"AWS::EC2::InternetGateway","Properties":{}}}}"#
        );
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["Resources"]["ASecond"]["Type"], json!("AWS::EC2::InternetGateway"));
        assert!(value.get("Outputs").is_none());
    }
}
