//! JSON rendering of template documents.

use crate::error::Result;
use crate::models::Document;
use std::io::Write;

/// Render `doc` as JSON, indented when `pretty` is set.
pub fn render_document(doc: &Document, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(doc)?
    } else {
        serde_json::to_string(doc)?
    };
    Ok(json)
}

/// Render `doc` fully, then write it followed by a newline.
///
/// The document is rendered before the first byte is written, so a failed
/// render leaves `out` untouched.
pub fn write_document<W: Write>(doc: &Document, out: &mut W, pretty: bool) -> Result<()> {
    let json = render_document(doc, pretty)?;
    writeln!(out, "{json}")?;
    out.flush()?;
    log::info!("Wrote template ({} bytes)", json.len() + 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{build_document, dev_plan};
    use serde_json::Value;

    #[test]
    fn test_render_pretty_and_compact_match() {
        let doc = build_document(&[dev_plan()]).unwrap();
        let pretty = render_document(&doc, true).unwrap();
        let compact = render_document(&doc, false).unwrap();
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
        let a: Value = serde_json::from_str(&pretty).unwrap();
        let b: Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_top_level_fields() {
        let doc = build_document(&[dev_plan()]).unwrap();
        let value: Value = serde_json::from_str(&render_document(&doc, false).unwrap()).unwrap();
        assert_eq!(value["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(
            value["Description"],
            "Stack for creating a VPC with private subnets, public subnets and protected subnets"
        );
        assert_eq!(value["Resources"].as_object().map(|r| r.len()), Some(22));
        assert_eq!(value["Resources"]["DEVVPC"]["Type"], "AWS::EC2::VPC");
        assert_eq!(
            value["Resources"]["DevRouteToInternet"]["DependsOn"],
            serde_json::json!(["DevInternetGatewayAttachment"])
        );
        assert_eq!(value["Outputs"]["DevVpcId"]["Value"]["Ref"], "DEVVPC");
    }

    #[test]
    fn test_write_document() {
        let doc = build_document(&[dev_plan()]).unwrap();
        let mut out = Vec::new();
        write_document(&doc, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(text.trim_end(), render_document(&doc, false).unwrap());
    }
}
