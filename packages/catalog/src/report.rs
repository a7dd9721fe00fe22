//! Regime report over a generated document.
//!
//! Works on untyped JSON so it can inspect documents from older builds,
//! including ones that carry regime nodes below the controls.

use std::collections::BTreeSet;

use serde_json::Value;

/// What the report found in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegimeReport {
    /// Root `name`, if present.
    pub root_name: Option<String>,
    /// Number of top-level branches.
    pub domain_count: usize,
    /// Distinct names of nodes one level below the controls.
    pub nested_regimes: BTreeSet<String>,
    /// Distinct regime full names referenced by control mappings.
    pub mapped_regimes: BTreeSet<String>,
}

fn children(node: &Value) -> &[Value] {
    node.get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Collect names of nodes exactly `depth` levels below `nodes`.
fn names_at_depth(nodes: &[Value], depth: usize, out: &mut BTreeSet<String>) {
    for node in nodes {
        if depth == 0 {
            if let Some(name) = node.get("name").and_then(Value::as_str) {
                out.insert(name.to_string());
            }
        } else {
            names_at_depth(children(node), depth - 1, out);
        }
    }
}

/// Collect regime names referenced by `mappings` anywhere in the tree.
fn mapped_names(nodes: &[Value], regimes: &[Value], out: &mut BTreeSet<String>) {
    for node in nodes {
        if let Some(mappings) = node.get("mappings").and_then(Value::as_object) {
            for key in mappings.keys() {
                let name = key
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| regimes.get(index))
                    .and_then(|regime| regime.get("fullName"))
                    .and_then(Value::as_str);
                if let Some(name) = name {
                    out.insert(name.to_string());
                }
            }
        }
        mapped_names(children(node), regimes, out);
    }
}

/// Build the report for a document whose tree has `levels` branch levels.
///
/// Regime nodes are looked for at depth `levels + 1` below the root's
/// children, i.e. directly under the controls.
pub fn regime_report(document: &Value, levels: usize) -> RegimeReport {
    let top = children(document);

    let mut nested_regimes = BTreeSet::new();
    names_at_depth(top, levels + 1, &mut nested_regimes);

    let regimes = document
        .get("regimeList")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let mut mapped_regimes = BTreeSet::new();
    mapped_names(top, regimes, &mut mapped_regimes);

    RegimeReport {
        root_name: document.get("name").and_then(Value::as_str).map(String::from),
        domain_count: top.len(),
        nested_regimes,
        mapped_regimes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn control(name: &str, mappings: Value, regimes: &[&str]) -> Value {
        let mut node = json!({
            "name": name,
            "description": "",
            "weight": 1.0,
            "mappings": mappings,
        });
        if !regimes.is_empty() {
            node["children"] = Value::Array(regimes.iter().map(|r| json!({ "name": r })).collect());
        }
        node
    }

    fn document(controls: Vec<Value>) -> Value {
        json!({
            "name": "SCF 2025.4",
            "regimeList": [
                { "index": 0, "category": "US", "name": "HIPAA", "fullName": "US HIPAA" },
                { "index": 1, "category": "EMEA", "name": "EU GDPR", "fullName": "EMEA EU GDPR" }
            ],
            "children": [
                { "name": "Governance", "children": [
                    { "name": "Govern", "children": [
                        { "name": "Process", "children": controls }
                    ]}
                ]},
                { "name": "Assets", "children": [] }
            ]
        })
    }

    #[test]
    fn test_nested_regimes_below_controls() {
        let doc = document(vec![
            control("GOV-01: A", json!({}), &["NIST CSF", "ISO 27001"]),
            control("GOV-02: B", json!({}), &["ISO 27001", "SOC 2"]),
        ]);
        let report = regime_report(&doc, 3);

        assert_eq!(report.root_name.as_deref(), Some("SCF 2025.4"));
        assert_eq!(report.domain_count, 2);
        assert_eq!(
            report.nested_regimes.into_iter().collect::<Vec<_>>(),
            vec!["ISO 27001", "NIST CSF", "SOC 2"]
        );
    }

    #[test]
    fn test_leaf_only_document_has_no_nested_regimes() {
        let doc = document(vec![control("GOV-01: A", json!({ "1": ["Art 5"] }), &[])]);
        let report = regime_report(&doc, 3);

        assert!(report.nested_regimes.is_empty());
        assert_eq!(
            report.mapped_regimes.into_iter().collect::<Vec<_>>(),
            vec!["EMEA EU GDPR"]
        );
    }

    #[test]
    fn test_unknown_mapping_index_is_ignored() {
        let doc = document(vec![control("GOV-01: A", json!({ "7": ["x"], "bad": [] }), &[])]);
        assert!(regime_report(&doc, 3).mapped_regimes.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let report = regime_report(&json!({}), 3);
        assert_eq!(report, RegimeReport::default());
    }
}
