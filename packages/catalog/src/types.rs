//! Core data types for the catalog document.
//!
//! The serialized shape is what the browser visualization consumes, so
//! field names are camelCase and object key order follows insertion order.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// A compliance regime column of the controls table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeDescriptor {
    /// Zero-based position in the regime column block.
    pub index: usize,

    /// First header line (e.g. "US").
    pub category: String,

    /// Remaining header lines joined by spaces.
    pub name: String,

    /// Whole header on one line.
    pub full_name: String,
}

/// Regime descriptors grouped by category, in first-seen category order.
pub type RegimeCatalog = IndexMap<String, Vec<RegimeDescriptor>>;

/// Domain name to principle intent text.
pub type DomainMetadata = IndexMap<String, String>;

/// Identifiers per regime index, in first-seen order without duplicates.
pub type Mappings = BTreeMap<usize, Vec<String>>;

/// Terminal node: one SCF control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlNode {
    /// `"{id}: {title}"`.
    pub name: String,
    pub description: String,
    pub weight: f64,
    pub mappings: Mappings,
}

/// Grouping node for one hierarchy dimension value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNode {
    pub name: String,
    pub children: Vec<HierarchyNode>,
}

/// A node of the rendered tree.
///
/// Branches and controls share no tag; a node with `children` is a branch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub enum HierarchyNode {
    Branch(BranchNode),
    Control(ControlNode),
}

impl HierarchyNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Branch(branch) => &branch.name,
            Self::Control(control) => &control.name,
        }
    }

    pub fn as_branch(&self) -> Option<&BranchNode> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Control(_) => None,
        }
    }

    pub fn as_control(&self) -> Option<&ControlNode> {
        match self {
            Self::Branch(_) => None,
            Self::Control(control) => Some(control),
        }
    }
}

impl Serialize for HierarchyNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Branch(branch) => branch.serialize(serializer),
            Self::Control(control) => control.serialize(serializer),
        }
    }
}

/// Wire form of [`HierarchyNode`] before the branch/control decision.
#[derive(Deserialize)]
struct RawNode {
    name: String,
    #[serde(default)]
    children: Option<Vec<HierarchyNode>>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    mappings: Option<Mappings>,
}

impl TryFrom<RawNode> for HierarchyNode {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if let Some(children) = raw.children {
            return Ok(Self::Branch(BranchNode {
                name: raw.name,
                children,
            }));
        }
        match (raw.description, raw.weight, raw.mappings) {
            (Some(description), Some(weight), Some(mappings)) => Ok(Self::Control(ControlNode {
                name: raw.name,
                description,
                weight,
                mappings,
            })),
            _ => Err(format!(
                "node '{}' has neither children nor control fields",
                raw.name
            )),
        }
    }
}

/// The complete output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub name: String,
    pub regime_catalog: RegimeCatalog,
    pub regime_list: Vec<RegimeDescriptor>,
    pub children: Vec<HierarchyNode>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub domain_metadata: DomainMetadata,
}

impl CatalogDocument {
    /// All control nodes, depth first in document order.
    pub fn controls(&self) -> Vec<&ControlNode> {
        fn collect<'a>(nodes: &'a [HierarchyNode], out: &mut Vec<&'a ControlNode>) {
            for node in nodes {
                match node {
                    HierarchyNode::Branch(branch) => collect(&branch.children, out),
                    HierarchyNode::Control(control) => out.push(control),
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.children, &mut out);
        out
    }

    /// Find a control by its identifier (the part of the name before `": "`).
    pub fn find_control(&self, control_id: &str) -> Option<&ControlNode> {
        self.controls().into_iter().find(|control| {
            control
                .name
                .split_once(": ")
                .map_or(control.name.as_str(), |(id, _)| id)
                == control_id
        })
    }
}
