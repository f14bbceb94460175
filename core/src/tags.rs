//! Mapping between typed node attributes and the string tags stored on ledger records.
//!
//! There are three fixed tag maps, each a superset of the previous one:
//! [`ROOT_TAG_MAP`] ⊂ [`NODE_TAG_MAP`] ⊂ [`BRANCH_TAG_MAP`]. Tags a map doesn't
//! recognize are carried verbatim in the node's `other_tags`.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use trackweave_proto::TagSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Type,
    MajorVersion,
    Root,
    CreatedAt,
    Tail,
    Head,
    Depth,
    BranchTail,
}

impl Attribute {
    pub const fn tag_name(self) -> &'static str {
        match self {
            Attribute::Type => "RDT-Type",
            Attribute::MajorVersion => "RDT-Major-Version",
            Attribute::Root => "Root-Id",
            Attribute::CreatedAt => "Created-At",
            Attribute::Tail => "Tail-Node",
            Attribute::Head => "Head-Node",
            Attribute::Depth => "Branch-Depth",
            Attribute::BranchTail => "Branch-Tail-Node",
        }
    }

    /// Inverse of [`Attribute::tag_name`].
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Some(match name {
            "RDT-Type" => Attribute::Type,
            "RDT-Major-Version" => Attribute::MajorVersion,
            "Root-Id" => Attribute::Root,
            "Created-At" => Attribute::CreatedAt,
            "Tail-Node" => Attribute::Tail,
            "Head-Node" => Attribute::Head,
            "Branch-Depth" => Attribute::Depth,
            "Branch-Tail-Node" => Attribute::BranchTail,
            _ => return None,
        })
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.tag_name()) }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TagMap {
    name: &'static str,
    attributes: &'static [Attribute],
}

pub const ROOT_TAG_MAP: TagMap = TagMap {
    name: "root",
    attributes: &[Attribute::Type, Attribute::MajorVersion, Attribute::Root, Attribute::CreatedAt, Attribute::Tail, Attribute::Head],
};

pub const NODE_TAG_MAP: TagMap = TagMap {
    name: "node",
    attributes: &[
        Attribute::Type,
        Attribute::MajorVersion,
        Attribute::Root,
        Attribute::CreatedAt,
        Attribute::Tail,
        Attribute::Head,
        Attribute::Depth,
    ],
};

pub const BRANCH_TAG_MAP: TagMap = TagMap {
    name: "branch",
    attributes: &[
        Attribute::Type,
        Attribute::MajorVersion,
        Attribute::Root,
        Attribute::CreatedAt,
        Attribute::Tail,
        Attribute::Head,
        Attribute::Depth,
        Attribute::BranchTail,
    ],
};

impl TagMap {
    pub fn name(&self) -> &'static str { self.name }

    pub fn attributes(&self) -> &'static [Attribute] { self.attributes }

    pub fn recognizes(&self, attribute: Attribute) -> bool { self.attributes.contains(&attribute) }

    /// The attribute a tag name maps to, if this map knows about it.
    pub fn lookup(&self, tag_name: &str) -> Option<Attribute> { Attribute::from_tag_name(tag_name).filter(|attr| self.recognizes(*attr)) }
}

/// The value of the `RDT-Type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Root,
    Node,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Node => "node",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for NodeType {
    type Err = DecodeError;

    // Older producers wrote "Root"; accept any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("root") {
            Ok(NodeType::Root)
        } else if s.eq_ignore_ascii_case("node") {
            Ok(NodeType::Node)
        } else {
            Err(DecodeError::InvalidValue { tag: Attribute::Type.tag_name(), value: s.to_string() })
        }
    }
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String { at.timestamp_millis().to_string() }

/// Parses the millisecond form written by [`format_timestamp`]; RFC 3339 strings
/// written by other producers are accepted as well.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DecodeError> {
    let invalid = || DecodeError::InvalidValue { tag: Attribute::CreatedAt.tag_name(), value: value.to_string() };
    match value.parse::<i64>() {
        Ok(millis) => DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(invalid),
        Err(_) => DateTime::parse_from_rfc3339(value).map(|at| at.with_timezone(&Utc)).map_err(|_| invalid()),
    }
}

/// Implemented by every node variant so [`encode`] can pull attribute values out of it.
pub trait TagSchema {
    /// The stringified value of `attribute`, or `None` if this node doesn't carry it.
    fn attribute(&self, attribute: Attribute) -> Option<String>;
    fn other_tags(&self) -> &BTreeMap<String, String>;
}

/// Raw attribute values picked out of a tag set by [`decode`], not yet typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagFields {
    values: BTreeMap<Attribute, String>,
    pub other_tags: BTreeMap<String, String>,
}

impl TagFields {
    pub fn get(&self, attribute: Attribute) -> Option<&str> { self.values.get(&attribute).map(String::as_str) }

    pub fn take(&mut self, attribute: Attribute) -> Option<String> { self.values.remove(&attribute) }

    pub fn take_required(&mut self, attribute: Attribute) -> Result<String, DecodeError> {
        self.take(attribute).ok_or(DecodeError::MissingTag(attribute.tag_name()))
    }

    pub fn take_u32(&mut self, attribute: Attribute) -> Result<u32, DecodeError> {
        let value = self.take_required(attribute)?;
        value.trim().parse().map_err(|_| DecodeError::InvalidValue { tag: attribute.tag_name(), value })
    }

    pub fn take_created_at(&mut self) -> Result<DateTime<Utc>, DecodeError> { parse_timestamp(&self.take_required(Attribute::CreatedAt)?) }

    pub fn take_type(&mut self) -> Result<NodeType, DecodeError> { self.take_required(Attribute::Type)?.parse() }
}

pub fn decode(tag_map: &TagMap, tags: &TagSet) -> TagFields {
    let mut fields = TagFields::default();
    for tag in tags {
        match tag_map.lookup(&tag.name) {
            Some(attribute) => {
                fields.values.insert(attribute, tag.value.clone());
            }
            None => {
                fields.other_tags.insert(tag.name.clone(), tag.value.clone());
            }
        }
    }
    fields
}

/// Passthrough tags are merged last and win over a mapped attribute of the same name.
pub fn encode<N: TagSchema + ?Sized>(tag_map: &TagMap, node: &N) -> TagSet {
    let mut tags = TagSet::new();
    for attribute in tag_map.attributes() {
        if let Some(value) = node.attribute(*attribute) {
            tags.insert(attribute.tag_name(), value);
        }
    }
    for (name, value) in node.other_tags() {
        if let Some(previous) = tags.insert(name.clone(), value.clone()) {
            tracing::warn!("passthrough tag {} overrides mapped value {:?}", name, previous);
        }
    }
    tags
}
