//! CloudFormation resource declarations and intrinsic function helpers.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

/// Pseudo parameter holding the id of the enclosing stack.
pub const STACK_ID: &str = "AWS::StackId";

/// Resource types emitted by the template builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Vpc,
    Subnet,
    RouteTable,
    Route,
    InternetGateway,
    NatGateway,
    Eip,
    VpcGatewayAttachment,
    SubnetRouteTableAssociation,
}

impl ResourceKind {
    /// CloudFormation type name.
    pub fn type_name(self) -> &'static str {
        match self {
            ResourceKind::Vpc => "AWS::EC2::VPC",
            ResourceKind::Subnet => "AWS::EC2::Subnet",
            ResourceKind::RouteTable => "AWS::EC2::RouteTable",
            ResourceKind::Route => "AWS::EC2::Route",
            ResourceKind::InternetGateway => "AWS::EC2::InternetGateway",
            ResourceKind::NatGateway => "AWS::EC2::NatGateway",
            ResourceKind::Eip => "AWS::EC2::EIP",
            ResourceKind::VpcGatewayAttachment => "AWS::EC2::VPCGatewayAttachment",
            ResourceKind::SubnetRouteTableAssociation => {
                "AWS::EC2::SubnetRouteTableAssociation"
            }
        }
    }

    /// Whether CloudFormation accepts a `Tags` property on this type.
    pub fn is_taggable(self) -> bool {
        matches!(
            self,
            ResourceKind::Vpc
                | ResourceKind::Subnet
                | ResourceKind::RouteTable
                | ResourceKind::InternetGateway
                | ResourceKind::NatGateway
                | ResourceKind::Eip
        )
    }
}

impl Serialize for ResourceKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.type_name())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// `{"Ref": id}`
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Fn::GetAtt": [id, attribute]}`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `{"Fn::Select": [ordinal, {"Fn::GetAZs": ""}]}`, the region's n-th zone.
pub fn select_az(ordinal: usize) -> Value {
    json!({ "Fn::Select": [ordinal, { "Fn::GetAZs": "" }] })
}

/// Target of a `Ref` value, if `value` is one.
pub fn ref_target(value: &Value) -> Option<&str> {
    value.as_object()?.get("Ref")?.as_str()
}

/// Collect every logical id named by `Ref` or `Fn::GetAtt` inside `value`.
pub fn collect_references<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                match (key.as_str(), inner) {
                    ("Ref", Value::String(id)) => out.push(id),
                    ("Fn::GetAtt", Value::Array(args)) => {
                        if let Some(Value::String(id)) = args.first() {
                            out.push(id);
                        }
                    }
                    _ => collect_references(inner, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_references(v, out)),
        _ => {}
    }
}

/// Single resource entry of a template.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResourceDeclaration {
    /// Key of the entry in the `Resources` mapping.
    #[serde(skip)]
    pub logical_id: String,
    pub kind: ResourceKind,
    pub properties: Map<String, Value>,
    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ResourceDeclaration {
    pub fn new(logical_id: impl Into<String>, kind: ResourceKind) -> Self {
        ResourceDeclaration {
            logical_id: logical_id.into(),
            kind,
            properties: Map::new(),
            depends_on: Vec::new(),
        }
    }

    /// Set a property, replacing any previous value.
    pub fn property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    /// Add a `DependsOn` edge.
    pub fn depends_on(mut self, logical_id: &str) -> Self {
        self.depends_on.push(logical_id.to_string());
        self
    }

    /// Attach `Tags` as `[{"Key", "Value"}]` in the given order.
    pub fn tags(self, tags: &[(&str, Value)]) -> Self {
        let tags: Vec<Value> = tags
            .iter()
            .map(|(key, value)| json!({ "Key": key, "Value": value }))
            .collect();
        self.property("Tags", tags)
    }

    /// Logical id a property refers to through `Ref`.
    pub fn ref_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(ref_target)
    }

    /// Availability zone ordinal of a subnet placed with [`select_az`].
    pub fn az_ordinal(&self) -> Option<u64> {
        let select = self
            .properties
            .get("AvailabilityZone")?
            .as_object()?
            .get("Fn::Select")?
            .as_array()?;
        select.first()?.as_u64()
    }

    /// Value of the tag with the given key.
    pub fn tag(&self, key: &str) -> Option<&Value> {
        self.properties
            .get("Tags")?
            .as_array()?
            .iter()
            .find(|t| t.get("Key").and_then(Value::as_str) == Some(key))?
            .get("Value")
    }

    /// Logical ids this resource points at, through properties or `DependsOn`.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for value in self.properties.values() {
            collect_references(value, &mut out);
        }
        out.extend(self.depends_on.iter().map(String::as_str));
        out
    }
}
