//! Existing-capability catalog and duplicate-lookup table.
//!
//! The catalog holds every capability the target add-in ecosystem already
//! ships. At build time each capability contributes several normalized name
//! variants to a lookup table used for O(1) duplicate probing. The table is
//! write-once per run: build it fully before the first duplicate query.
//!
//! Key collisions resolve first-writer-wins. A later capability whose keys
//! are already taken stays invisible to keyed lookup (it remains reachable
//! through the description-similarity scan over the raw entry list); every
//! shadowed key is recorded so the collision policy is observable rather
//! than silent.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separator characters stripped or rewritten when normalizing names.
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_\s-]+").unwrap());

/// A capability the ecosystem already provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownCapability {
    /// Short display name, e.g. `Filter`
    pub name: String,

    /// Namespace path, e.g. `addin.select.Filter`
    pub qualified_path: String,

    /// Free-text description used by the similarity scan
    pub description: String,

    /// Semantic groupings this capability belongs to
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl KnownCapability {
    /// Convenience constructor for catalog literals.
    pub fn new(name: &str, qualified_path: &str, description: &str, categories: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            qualified_path: qualified_path.to_string(),
            description: description.to_string(),
            categories: categories.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Lookup-key variants this capability contributes to the table.
    ///
    /// Every capability yields at least two distinct keys (raw lowercase
    /// name plus a separator-stripped form); path and spaced variants widen
    /// the net for multi-word proposals.
    fn lookup_keys(&self) -> Vec<String> {
        let lower = self.name.to_lowercase();
        let path = self.qualified_path.to_lowercase();
        let stripped = SEPARATORS.replace_all(&lower, "").into_owned();
        let spaced = SEPARATORS.replace_all(&lower, " ").trim().to_string();

        // Single-word names collapse several variants into one key; keep
        // each distinct key once, in variant order.
        let mut keys: Vec<String> = Vec::with_capacity(4);
        for k in [lower, path, stripped, spaced] {
            if !k.is_empty() && !keys.contains(&k) {
                keys.push(k);
            }
        }
        keys
    }
}

/// A lookup key that lost the first-writer-wins race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowedKey {
    /// The colliding normalized key
    pub key: String,

    /// Name of the capability that owns the key
    pub winner: String,

    /// Name of the capability whose registration was skipped
    pub loser: String,
}

/// Write-once catalog with a multi-key duplicate-lookup table.
#[derive(Debug, Default)]
pub struct CapabilityCatalog {
    /// All capabilities in registration order
    entries: Vec<KnownCapability>,

    /// Normalized key → index into `entries`; insertion order preserved
    lookup: IndexMap<String, usize>,

    /// Keys hidden by earlier registrations
    shadowed: Vec<ShadowedKey>,
}

impl CapabilityCatalog {
    /// Build the lookup table over `entries`. First registration of a key
    /// wins; later collisions are recorded, not overwritten.
    pub fn build(entries: Vec<KnownCapability>) -> Self {
        let mut lookup: IndexMap<String, usize> = IndexMap::new();
        let mut shadowed = Vec::new();

        for (idx, cap) in entries.iter().enumerate() {
            for key in cap.lookup_keys() {
                match lookup.get(&key) {
                    None => {
                        lookup.insert(key, idx);
                    }
                    Some(&winner_idx) => {
                        debug!(key = %key, winner = %entries[winner_idx].name, loser = %cap.name,
                               "lookup key shadowed by earlier capability");
                        shadowed.push(ShadowedKey {
                            key,
                            winner: entries[winner_idx].name.clone(),
                            loser: cap.name.clone(),
                        });
                    }
                }
            }
        }

        debug!(
            capabilities = entries.len(),
            keys = lookup.len(),
            shadowed = shadowed.len(),
            "capability catalog built"
        );

        Self {
            entries,
            lookup,
            shadowed,
        }
    }

    /// Load a catalog from a JSON array of capabilities.
    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path)
            .with_context(|| format!("Failed to open catalog file: {}", path.display()))?;
        let entries: Vec<KnownCapability> = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("Failed to parse catalog JSON: {}", path.display()))?;

        Ok(Self::build(entries))
    }

    /// Exact lookup by normalized key.
    pub fn lookup(&self, key: &str) -> Option<&KnownCapability> {
        self.lookup.get(key).map(|&idx| &self.entries[idx])
    }

    /// All lookup keys with their owning capability, in registration order.
    pub fn keyed_entries(&self) -> impl Iterator<Item = (&str, &KnownCapability)> {
        self.lookup
            .iter()
            .map(|(k, &idx)| (k.as_str(), &self.entries[idx]))
    }

    /// Raw capability list, including entries hidden from keyed lookup.
    pub fn entries(&self) -> &[KnownCapability] {
        &self.entries
    }

    /// Keys that lost a first-writer-wins collision.
    pub fn shadowed(&self) -> &[ShadowedKey] {
        &self.shadowed
    }

    /// Top-level namespace prefixes (`addin.`, `host.`, ...) derived from
    /// qualified paths. Used to resolve API references in build specs.
    pub fn api_namespaces(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter_map(|c| {
                c.qualified_path
                    .split_once('.')
                    .map(|(head, _)| format!("{}.", head.to_lowercase()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run the `catalog` command: inspect the duplicate-suppression database,
/// including the keys hidden by first-writer-wins collisions.
pub fn run(args: crate::cli::CatalogArgs, _ctx: &crate::cli::AppContext) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => CapabilityCatalog::load(path)?,
        None => CapabilityCatalog::build(builtin_capabilities()),
    };

    if args.json {
        let value = serde_json::json!({
            "capabilities": catalog.entries(),
            "lookup_keys": catalog.lookup.len(),
            "shadowed_keys": catalog.shadowed(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for cap in catalog.entries() {
        println!("{:<24} {:<36} {}", cap.name, cap.qualified_path, cap.description);
    }

    if catalog.shadowed().is_empty() {
        println!("\nno shadowed lookup keys");
    } else {
        println!("\nshadowed lookup keys:");
        for s in catalog.shadowed() {
            println!("  {:<24} kept {} over {}", s.key, s.winner, s.loser);
        }
    }

    Ok(())
}

/// Built-in catalog of core add-in capabilities.
///
/// Serves as the default duplicate-suppression database when no catalog file
/// is supplied; a real deployment replaces this with the mapped surface of
/// its own ecosystem.
pub fn builtin_capabilities() -> Vec<KnownCapability> {
    vec![
        KnownCapability::new(
            "Filter",
            "addin.select.Filter",
            "Primary filtering class for element selection and filtering operations",
            &["selection", "filtering"],
        ),
        KnownCapability::new(
            "by_category",
            "addin.select.Filter.by_category",
            "Filter elements by category",
            &["filtering", "category"],
        ),
        KnownCapability::new(
            "by_parameter",
            "addin.select.Filter.by_parameter",
            "Filter elements by parameter value",
            &["filtering", "parameters"],
        ),
        KnownCapability::new(
            "intersect",
            "addin.select.Filter.intersect",
            "Filter elements by geometric intersection",
            &["filtering", "geometry"],
        ),
        KnownCapability::new(
            "range",
            "addin.select.Filter.range",
            "Filter elements by parameter value range",
            &["filtering", "parameters"],
        ),
        KnownCapability::new(
            "Element",
            "addin.model.Element",
            "Wrapper class for model elements with enhanced functionality",
            &["elements", "wrapper"],
        ),
        KnownCapability::new(
            "Parameter",
            "addin.model.Parameter",
            "Parameter access and manipulation utilities",
            &["parameters", "utilities"],
        ),
        KnownCapability::new(
            "Selection",
            "addin.select.Selection",
            "Selection management and utilities",
            &["selection", "utilities"],
        ),
        KnownCapability::new(
            "get_selection",
            "ui.selection.get_selection",
            "Get currently selected elements",
            &["selection", "utilities"],
        ),
        KnownCapability::new(
            "pick_element",
            "ui.selection.pick_element",
            "Interactive element selection",
            &["selection", "interactive"],
        ),
        KnownCapability::new(
            "alert",
            "ui.forms.alert",
            "Display alert dialog to user",
            &["ui", "dialogs"],
        ),
        KnownCapability::new(
            "print_table",
            "ui.output.print_table",
            "Print formatted table to output window",
            &["output", "formatting"],
        ),
        KnownCapability::new(
            "ElementCollector",
            "host.db.ElementCollector",
            "Collect filtered elements from the host document",
            &["collection", "filtering"],
        ),
        KnownCapability::new(
            "Transaction",
            "host.db.Transaction",
            "Create transaction for model modifications",
            &["transactions", "modifications"],
        ),
        KnownCapability::new(
            "CategoryFilter",
            "host.db.CategoryFilter",
            "Filter elements by category",
            &["filtering", "category"],
        ),
        KnownCapability::new(
            "ParameterFilter",
            "host.db.ParameterFilter",
            "Create parameter-based filter",
            &["filtering", "parameters"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(name: &str, path: &str, desc: &str) -> KnownCapability {
        KnownCapability::new(name, path, desc, &[])
    }

    #[test]
    fn key_variants_generated() {
        let catalog = CapabilityCatalog::build(vec![cap(
            "smart_align",
            "addin.tools.smart_align",
            "aligns elements",
        )]);

        assert!(catalog.lookup("smart_align").is_some());
        assert!(catalog.lookup("addin.tools.smart_align").is_some());
        assert!(catalog.lookup("smartalign").is_some());
        assert!(catalog.lookup("smart align").is_some());
        assert!(catalog.lookup("smart").is_none());
    }

    #[test]
    fn first_writer_wins_and_shadowing_is_recorded() {
        let catalog = CapabilityCatalog::build(vec![
            cap("Filter", "addin.select.Filter", "element filtering"),
            cap("filter", "host.db.Filter", "database-side filtering"),
        ]);

        // The earlier registration owns the colliding keys.
        let hit = catalog.lookup("filter").unwrap();
        assert_eq!(hit.qualified_path, "addin.select.Filter");

        // The later capability's distinct key still resolves.
        let by_path = catalog.lookup("host.db.filter").unwrap();
        assert_eq!(by_path.name, "filter");

        // Shadowing is observable.
        assert!(!catalog.shadowed().is_empty());
        assert!(catalog.shadowed().iter().all(|s| s.winner == "Filter"));

        // Both entries remain in the raw list for similarity scans.
        assert_eq!(catalog.entries().len(), 2);
    }

    #[test]
    fn lookup_is_stable_after_build() {
        let catalog = CapabilityCatalog::build(builtin_capabilities());

        // Whatever a key resolved to at build time it resolves to forever.
        let first: Vec<(String, String)> = catalog
            .keyed_entries()
            .map(|(k, c)| (k.to_string(), c.qualified_path.clone()))
            .collect();

        for (key, path) in &first {
            assert_eq!(&catalog.lookup(key).unwrap().qualified_path, path);
        }
    }

    #[test]
    fn api_namespaces_from_paths() {
        let catalog = CapabilityCatalog::build(builtin_capabilities());
        let ns = catalog.api_namespaces();

        assert!(ns.contains("addin."));
        assert!(ns.contains("host."));
        assert!(ns.contains("ui."));
    }
}
