//! Regime header parsing.
//!
//! Every column from the regime offset onward is one compliance regime. Its
//! header is a multi-line label: the first line names the category (usually
//! a jurisdiction or "General"), the remaining lines the regime itself.
//!
//! ```text
//! "EMEA\nEU\nGDPR"  ->  category "EMEA", name "EU GDPR", fullName "EMEA EU GDPR"
//! ```

use crate::config::DEFAULT_REGIME_CATEGORY;
use crate::types::{RegimeCatalog, RegimeDescriptor};

/// All regimes of a controls table, as a flat list and grouped by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegimeSet {
    pub list: Vec<RegimeDescriptor>,
    pub catalog: RegimeCatalog,
}

impl RegimeSet {
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Parse one raw regime header. Never fails.
///
/// # Examples
/// ```
/// use scf_catalog::regime::parse_regime_header;
///
/// let regime = parse_regime_header(3, "US\nHIPAA\n");
/// assert_eq!(regime.category, "US");
/// assert_eq!(regime.name, "HIPAA");
/// assert_eq!(regime.full_name, "US HIPAA");
/// ```
#[must_use]
pub fn parse_regime_header(index: usize, raw: &str) -> RegimeDescriptor {
    let mut lines = raw.split('\n').map(str::trim);

    let category = match lines.next() {
        Some(first) if !first.is_empty() => first.to_string(),
        _ => DEFAULT_REGIME_CATEGORY.to_string(),
    };

    let name = lines.filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ");
    let name = if name.is_empty() {
        category.clone()
    } else {
        name
    };

    let full_name = raw.trim().replace('\n', " ").replace('\r', "");

    RegimeDescriptor {
        index,
        category,
        name,
        full_name,
    }
}

/// Parse the regime block of a header row.
///
/// `headers` must start at the first regime column; indices count from zero.
pub fn parse_regime_headers<I, S>(headers: I) -> RegimeSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = RegimeSet::default();

    for (index, raw) in headers.into_iter().enumerate() {
        let regime = parse_regime_header(index, raw.as_ref());
        set.catalog
            .entry(regime.category.clone())
            .or_default()
            .push(regime.clone());
        set.list.push(regime);
    }

    set
}
