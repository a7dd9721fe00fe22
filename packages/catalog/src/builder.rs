//! Hierarchy construction from control rows.
//!
//! Rows are folded into a tree whose inner levels are the hierarchy
//! dimension values and whose leaves are controls. Branches and controls
//! live in two arenas owned by the builder; the tree only stores arena
//! positions, so a later row for the same control can update its leaf
//! through the id lookup without walking the tree again.
//!
//! ```text
//! root
//! └── "Cybersecurity & Data Protection Governance"   (domain)
//!     └── "Govern"                                   (function grouping)
//!         └── "Process"                              (applicability)
//!             └── "GOV-01: Cybersecurity & Data Protection Governance Program"
//! ```

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::DEFAULT_WEIGHT;
use crate::regime::RegimeSet;
use crate::types::{
    BranchNode, CatalogDocument, ControlNode, DomainMetadata, HierarchyNode, Mappings,
};

/// One control row, with fields already bound to their columns.
///
/// Values are raw cell text; the builder trims them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlRow<'r> {
    pub id: &'r str,
    pub name: &'r str,
    pub description: &'r str,
    pub weighting: &'r str,
    /// Hierarchy dimension values, outer to inner.
    pub path: Vec<&'r str>,
    /// One cell per regime, by regime index.
    pub regime_cells: Vec<&'r str>,
}

/// What happened to a row passed to [`HierarchyBuilder::add_row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// First row of a control: a new leaf was created.
    Inserted,
    /// Repeat row: mappings were merged into the existing leaf.
    Merged,
    /// Empty control id.
    Skipped,
}

/// Counters reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Unique controls added to the tree.
    pub processed: usize,
    /// Rows that enriched an already known control.
    pub merged: usize,
    /// Rows without a control id.
    pub skipped: usize,
    /// Controls whose weighting fell back to the default.
    pub defaulted_weights: usize,
}

/// Result of [`parse_weight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedWeight {
    pub value: f64,
    /// `true` when `value` is the default rather than the parsed text.
    pub defaulted: bool,
}

/// Parse a relative control weighting.
///
/// Text that is not a finite number yields [`DEFAULT_WEIGHT`].
///
/// # Examples
/// ```
/// use scf_catalog::builder::parse_weight;
///
/// assert_eq!(parse_weight("3").value, 3.0);
/// assert_eq!(parse_weight("abc").value, 1.0);
/// assert!(parse_weight("abc").defaulted);
/// ```
#[must_use]
pub fn parse_weight(raw: &str) -> ParsedWeight {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => ParsedWeight {
            value,
            defaulted: false,
        },
        _ => ParsedWeight {
            value: DEFAULT_WEIGHT,
            defaulted: true,
        },
    }
}

/// Derive the identifier list of one regime cell.
///
/// A bare `x` marks the control itself; anything else is a list of external
/// identifiers separated by commas or line breaks. Empty cells yield nothing.
///
/// # Examples
/// ```
/// use scf_catalog::builder::parse_identifiers;
///
/// assert_eq!(parse_identifiers(" X ", "GOV-01"), vec!["GOV-01"]);
/// assert_eq!(parse_identifiers("AC-1, AC-2\nAC-3", "GOV-01"), vec!["AC-1", "AC-2", "AC-3"]);
/// assert!(parse_identifiers("   ", "GOV-01").is_empty());
/// ```
#[must_use]
pub fn parse_identifiers(cell: &str, control_id: &str) -> Vec<String> {
    let value = cell.trim();
    if value.is_empty() {
        return Vec::new();
    }
    if value.eq_ignore_ascii_case("x") {
        return vec![control_id.to_string()];
    }

    value
        .split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

/// Union `cells` into `mappings`, keeping first-seen order.
fn merge_mappings(
    mappings: &mut Mappings,
    control_id: &str,
    cells: &[&str],
    regime_count: usize,
) {
    for index in 0..regime_count {
        let cell = cells.get(index).copied().unwrap_or_default();
        let identifiers = parse_identifiers(cell, control_id);
        if identifiers.is_empty() {
            continue;
        }

        let existing = mappings.entry(index).or_default();
        for identifier in identifiers {
            if !existing.contains(&identifier) {
                existing.push(identifier);
            }
        }
    }
}

/// Position of a child in one of the builder's arenas.
#[derive(Debug, Clone, Copy)]
enum NodeRef {
    Branch(usize),
    Control(usize),
}

#[derive(Debug)]
struct Branch {
    name: String,
    /// Child branch name to branch arena position.
    index: HashMap<String, usize>,
    /// Children in insertion order.
    children: Vec<NodeRef>,
}

impl Branch {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: HashMap::new(),
            children: Vec::new(),
        }
    }
}

const ROOT: usize = 0;

/// Single-owner builder folding control rows into a tree.
#[derive(Debug)]
pub struct HierarchyBuilder {
    regimes: RegimeSet,
    branches: Vec<Branch>,
    controls: Vec<ControlNode>,
    /// Control id to control arena position.
    lookup: HashMap<String, usize>,
    summary: BuildSummary,
}

impl HierarchyBuilder {
    pub fn new(regimes: RegimeSet) -> Self {
        Self {
            regimes,
            branches: vec![Branch::new("")],
            controls: Vec::new(),
            lookup: HashMap::new(),
            summary: BuildSummary::default(),
        }
    }

    pub fn regimes(&self) -> &RegimeSet {
        &self.regimes
    }

    pub fn summary(&self) -> BuildSummary {
        self.summary
    }

    /// The leaf of a control, if one was created.
    pub fn control(&self, control_id: &str) -> Option<&ControlNode> {
        self.lookup
            .get(control_id.trim())
            .and_then(|&position| self.controls.get(position))
    }

    /// Fold one row into the tree.
    pub fn add_row(&mut self, row: &ControlRow<'_>) -> RowOutcome {
        let id = row.id.trim();
        if id.is_empty() {
            self.summary.skipped += 1;
            debug!("Skipping row without control id");
            return RowOutcome::Skipped;
        }

        let regime_count = self.regimes.len();

        if let Some(&position) = self.lookup.get(id) {
            if let Some(control) = self.controls.get_mut(position) {
                merge_mappings(&mut control.mappings, id, &row.regime_cells, regime_count);
            }
            self.summary.merged += 1;
            debug!(control = id, "Merged repeat row");
            return RowOutcome::Merged;
        }

        let parent = self.ensure_path(&row.path);

        let weight = parse_weight(row.weighting);
        if weight.defaulted {
            self.summary.defaulted_weights += 1;
            debug!(
                control = id,
                weighting = row.weighting,
                "Weighting is not a number, using default"
            );
        }

        let mut control = ControlNode {
            name: format!("{id}: {}", row.name.trim()),
            description: row.description.trim().to_string(),
            weight: weight.value,
            mappings: Mappings::new(),
        };
        merge_mappings(&mut control.mappings, id, &row.regime_cells, regime_count);

        let position = self.controls.len();
        self.controls.push(control);
        self.lookup.insert(id.to_string(), position);
        self.branches[parent].children.push(NodeRef::Control(position));

        self.summary.processed += 1;
        RowOutcome::Inserted
    }

    /// Walk the path from the root, creating missing branches.
    ///
    /// Returns the branch arena position of the innermost branch.
    fn ensure_path(&mut self, path: &[&str]) -> usize {
        let mut current = ROOT;

        for value in path.iter().map(|v| v.trim()) {
            let existing = self.branches[current].index.get(value).copied();
            current = match existing {
                Some(child) => child,
                None => {
                    let child = self.branches.len();
                    self.branches.push(Branch::new(value));
                    let parent = &mut self.branches[current];
                    parent.index.insert(value.to_string(), child);
                    parent.children.push(NodeRef::Branch(child));
                    child
                }
            };
        }

        current
    }

    /// Convert the tree into the output document.
    pub fn finish(self, catalog_name: &str, domain_metadata: DomainMetadata) -> CatalogDocument {
        info!(
            processed = self.summary.processed,
            merged = self.summary.merged,
            skipped = self.summary.skipped,
            "Hierarchy built"
        );

        let mut controls: Vec<Option<ControlNode>> = self.controls.into_iter().map(Some).collect();
        let children = render_children(&self.branches, ROOT, &mut controls);

        CatalogDocument {
            name: catalog_name.to_string(),
            regime_catalog: self.regimes.catalog,
            regime_list: self.regimes.list,
            children,
            domain_metadata,
        }
    }
}

/// Turn a branch's children into nodes, in insertion order.
fn render_children(
    branches: &[Branch],
    branch: usize,
    controls: &mut [Option<ControlNode>],
) -> Vec<HierarchyNode> {
    let Some(branch) = branches.get(branch) else {
        return Vec::new();
    };

    branch
        .children
        .iter()
        .filter_map(|child| match *child {
            NodeRef::Branch(position) => {
                let name = branches.get(position)?.name.clone();
                Some(HierarchyNode::Branch(BranchNode {
                    name,
                    children: render_children(branches, position, controls),
                }))
            }
            NodeRef::Control(position) => controls
                .get_mut(position)
                .and_then(Option::take)
                .map(HierarchyNode::Control),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::parse_regime_headers;
    use pretty_assertions::assert_eq;

    fn builder(regimes: &[&str]) -> HierarchyBuilder {
        HierarchyBuilder::new(parse_regime_headers(regimes))
    }

    fn row<'r>(id: &'r str, path: [&'r str; 3], cells: Vec<&'r str>) -> ControlRow<'r> {
        ControlRow {
            id,
            name: "Title",
            description: "Description",
            weighting: "1",
            path: path.to_vec(),
            regime_cells: cells,
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("3"), ParsedWeight { value: 3.0, defaulted: false });
        assert_eq!(parse_weight(" 2.5 "), ParsedWeight { value: 2.5, defaulted: false });
        assert_eq!(parse_weight("0").value, 0.0);
        assert_eq!(parse_weight("abc"), ParsedWeight { value: 1.0, defaulted: true });
        assert_eq!(parse_weight(""), ParsedWeight { value: 1.0, defaulted: true });
        assert!(parse_weight("NaN").defaulted);
        assert!(parse_weight("inf").defaulted);
    }

    #[test]
    fn test_parse_identifiers_mark() {
        assert_eq!(parse_identifiers("x", "GOV-01"), ids(&["GOV-01"]));
        assert_eq!(parse_identifiers("X", "GOV-01"), ids(&["GOV-01"]));
        assert_eq!(parse_identifiers("  x\n", "GOV-01"), ids(&["GOV-01"]));
    }

    #[test]
    fn test_parse_identifiers_list() {
        assert_eq!(
            parse_identifiers("AC-1, AC-2\nAC-3", "GOV-01"),
            ids(&["AC-1", "AC-2", "AC-3"])
        );
        assert_eq!(
            parse_identifiers("8.1\r\n,, 8.2 ,\n", "GOV-01"),
            ids(&["8.1", "8.2"])
        );
        assert_eq!(parse_identifiers("xx", "GOV-01"), ids(&["xx"]));
    }

    #[test]
    fn test_parse_identifiers_empty() {
        assert!(parse_identifiers("", "GOV-01").is_empty());
        assert!(parse_identifiers(" \n\t", "GOV-01").is_empty());
        assert!(parse_identifiers(" , ,", "GOV-01").is_empty());
    }

    #[test]
    fn test_repeat_rows_merge_into_one_leaf() {
        let mut builder = builder(&["US\nRegime A", "US\nRegime B"]);

        let mut first = row("GOV-01", ["Governance", "Govern", "All"], vec!["x", ""]);
        first.weighting = "2.5";
        first.name = "Program";
        let mut second = row("GOV-01", ["Elsewhere", "Other", "None"], vec!["", "REQ-9"]);
        second.weighting = "9";
        second.name = "Renamed";

        assert_eq!(builder.add_row(&first), RowOutcome::Inserted);
        assert_eq!(builder.add_row(&second), RowOutcome::Merged);

        let document = builder.finish("SCF", DomainMetadata::new());
        let controls = document.controls();
        assert_eq!(controls.len(), 1);

        let control = controls[0];
        assert_eq!(control.name, "GOV-01: Program");
        assert_eq!(control.weight, 2.5);
        assert_eq!(control.mappings.get(&0), Some(&ids(&["GOV-01"])));
        assert_eq!(control.mappings.get(&1), Some(&ids(&["REQ-9"])));

        // The repeat row's path never materialises.
        assert_eq!(document.children.len(), 1);
        assert_eq!(document.children[0].name(), "Governance");
    }

    #[test]
    fn test_mappings_union_without_duplicates() {
        let mut builder = builder(&["Regime"]);
        builder.add_row(&row("IAC-01", ["D", "G", "A"], vec!["A-1, A-2"]));
        builder.add_row(&row("IAC-01", ["D", "G", "A"], vec!["A-2\nA-3"]));
        builder.add_row(&row("IAC-01", ["D", "G", "A"], vec!["a-1"]));

        let control = builder.control("IAC-01").unwrap();
        assert_eq!(control.mappings.get(&0), Some(&ids(&["A-1", "A-2", "A-3", "a-1"])));
    }

    #[test]
    fn test_initial_list_is_deduplicated() {
        let mut builder = builder(&["Regime"]);
        builder.add_row(&row("IAC-01", ["D", "G", "A"], vec!["A-1, A-1"]));
        let control = builder.control("IAC-01").unwrap();
        assert_eq!(control.mappings.get(&0), Some(&ids(&["A-1"])));
    }

    #[test]
    fn test_empty_cells_create_no_keys() {
        let mut builder = builder(&["One", "Two", "Three"]);
        builder.add_row(&row("AST-01", ["D", "G", "A"], vec!["", "  ", "x"]));
        builder.add_row(&row("AST-01", ["D", "G", "A"], vec!["", "\n"]));

        let control = builder.control("AST-01").unwrap();
        assert_eq!(control.mappings.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_cells_beyond_regime_count_are_ignored() {
        let mut builder = builder(&["Only"]);
        builder.add_row(&row("AST-01", ["D", "G", "A"], vec!["x", "extra"]));
        let control = builder.control("AST-01").unwrap();
        assert_eq!(control.mappings.len(), 1);
    }

    #[test]
    fn test_rows_without_id_are_skipped() {
        let mut builder = builder(&[]);
        assert_eq!(builder.add_row(&row("  ", ["D", "G", "A"], vec![])), RowOutcome::Skipped);
        assert_eq!(builder.summary().skipped, 1);
        assert_eq!(builder.summary().processed, 0);

        let document = builder.finish("SCF", DomainMetadata::new());
        assert!(document.children.is_empty());
    }

    #[test]
    fn test_paths_are_shared_and_ordered() {
        let mut builder = builder(&[]);
        builder.add_row(&row("B-01", ["Beta", "Govern", "Process"], vec![]));
        builder.add_row(&row("A-01", ["Alpha", "Protect", "Technology"], vec![]));
        builder.add_row(&row("B-02", ["Beta", "Govern", "Process"], vec![]));
        builder.add_row(&row("B-03", ["Beta", "Detect", "Process"], vec![]));
        builder.add_row(&row("B-04", [" Beta ", "Govern", "People"], vec![]));

        let document = builder.finish("SCF", DomainMetadata::new());

        let domains: Vec<&str> = document.children.iter().map(HierarchyNode::name).collect();
        assert_eq!(domains, vec!["Beta", "Alpha"]);

        let beta = document.children[0].as_branch().unwrap();
        let groupings: Vec<&str> = beta.children.iter().map(HierarchyNode::name).collect();
        assert_eq!(groupings, vec!["Govern", "Detect"]);

        let govern = beta.children[0].as_branch().unwrap();
        let applicability: Vec<&str> = govern.children.iter().map(HierarchyNode::name).collect();
        assert_eq!(applicability, vec!["Process", "People"]);

        let process = govern.children[0].as_branch().unwrap();
        let controls: Vec<&str> = process.children.iter().map(HierarchyNode::name).collect();
        assert_eq!(controls, vec!["B-01: Title", "B-02: Title"]);
    }

    #[test]
    fn test_summary_counts() {
        let mut builder = builder(&[]);
        let mut unweighted = row("C-01", ["D", "G", "A"], vec![]);
        unweighted.weighting = "high";
        builder.add_row(&unweighted);
        builder.add_row(&row("C-01", ["D", "G", "A"], vec![]));
        builder.add_row(&row("C-02", ["D", "G", "A"], vec![]));
        builder.add_row(&row("", ["D", "G", "A"], vec![]));

        assert_eq!(
            builder.summary(),
            BuildSummary {
                processed: 2,
                merged: 1,
                skipped: 1,
                defaulted_weights: 1,
            }
        );
        assert_eq!(builder.control("C-01").unwrap().weight, 1.0);
    }

    #[test]
    fn test_finish_carries_regimes() {
        let builder = builder(&["US\nHIPAA", "EMEA\nEU\nGDPR"]);
        let document = builder.finish("SCF 2025.4", DomainMetadata::new());

        assert_eq!(document.name, "SCF 2025.4");
        assert_eq!(document.regime_list.len(), 2);
        assert_eq!(document.regime_catalog.keys().collect::<Vec<_>>(), vec!["US", "EMEA"]);
    }
}
