//! Build specifications for suggestions.
//!
//! Each suggestion gets one `BuildSpec` describing what implementing it
//! would take: API surface touched, external dependencies, complexity tier,
//! and an hour estimate. The validator consumes these; the pipeline refuses
//! to proceed when a spec falls below the completeness floor.

use serde::{Deserialize, Serialize};

use crate::core::generate::{Category, Suggestion};
use crate::infra::config::ScoringConfig;

/// Implementation complexity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Simple API calls, minimal logic
    Low,
    /// Multiple API calls, moderate logic
    #[default]
    Medium,
    /// Complex algorithms or external integrations
    High,
    /// Advanced features, significant development
    Expert,
}

impl Complexity {
    /// Fixed complexity weight used by the ease score: 1 − weight.
    pub fn weight(self) -> f64 {
        match self {
            Complexity::Low => 0.2,
            Complexity::Medium => 0.5,
            Complexity::High => 0.8,
            Complexity::Expert => 1.0,
        }
    }

    /// Nominal development estimate per tier.
    pub fn development_hours(self) -> u32 {
        match self {
            Complexity::Low => 4,
            Complexity::Medium => 8,
            Complexity::High => 16,
            Complexity::Expert => 40,
        }
    }

    /// Nominal effort estimate on a 0–100 scale.
    fn effort_estimate(self) -> u32 {
        match self {
            Complexity::Low => 20,
            Complexity::Medium => 40,
            Complexity::High => 65,
            Complexity::Expert => 90,
        }
    }
}

/// Implementation profile of one suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSpec {
    /// Id of the suggestion this spec belongs to
    pub suggestion_id: String,

    /// Qualified API references the implementation would touch
    pub api_requirements: Vec<String>,

    /// Packages outside the host platform
    #[serde(default)]
    pub external_dependencies: Vec<String>,

    /// Complexity tier
    pub complexity_level: Complexity,

    /// Estimated development hours
    pub development_hours: u32,

    /// Implementation effort on a 0–100 scale
    pub effort_estimate: u32,

    /// Host-compatibility constant carried into feasibility scoring
    pub compatibility: f64,

    /// Fraction of spec sections populated
    pub completeness: f64,
}

/// Derives build specs from suggestions.
pub struct Specifier<'a> {
    cfg: &'a ScoringConfig,
}

impl<'a> Specifier<'a> {
    pub fn new(cfg: &'a ScoringConfig) -> Self {
        Self { cfg }
    }

    pub fn derive(&self, suggestion: &Suggestion) -> BuildSpec {
        let complexity = classify(&suggestion.functionality);

        let mut api_requirements = base_apis(suggestion.category);
        let mut external_dependencies = Vec::new();

        match complexity {
            Complexity::High => {
                api_requirements.push("ext.analytics.Engine".to_string());
                external_dependencies.push("analytics-runtime".to_string());
            }
            Complexity::Expert => {
                api_requirements.push("ext.analytics.Engine".to_string());
                external_dependencies.push("analytics-runtime".to_string());
                external_dependencies.push("ml-toolkit".to_string());
            }
            Complexity::Low | Complexity::Medium => {}
        }

        let spec = BuildSpec {
            suggestion_id: suggestion.id.clone(),
            api_requirements,
            external_dependencies,
            complexity_level: complexity,
            development_hours: complexity.development_hours(),
            effort_estimate: complexity.effort_estimate(),
            compatibility: self.cfg.compatibility_constant,
            completeness: 0.0,
        };

        BuildSpec {
            completeness: completeness_of(&spec),
            ..spec
        }
    }
}

/// Classify complexity from functionality wording.
fn classify(functionality: &str) -> Complexity {
    const COMPLEX: &[&str] = &["predictive", "learning", "integration", "simulation", "analysis"];
    const SIMPLE: &[&str] = &["selection", "export", "report", "formatting", "monitoring"];

    let text = functionality.to_lowercase();

    if COMPLEX.iter().any(|w| text.contains(w)) {
        Complexity::High
    } else if SIMPLE.iter().any(|w| text.contains(w)) {
        Complexity::Low
    } else {
        Complexity::Medium
    }
}

/// API surface a category's implementation starts from.
fn base_apis(category: Category) -> Vec<String> {
    let apis: &[&str] = match category {
        Category::SelectionFiltering => &["host.db.ElementCollector", "addin.select.Filter"],
        Category::ModelManagement => &["host.db.Transaction", "addin.model.Element"],
        Category::Documentation => &["ui.output.print_table", "addin.model.Parameter"],
        Category::Automation => &["host.db.Transaction", "ui.selection.get_selection"],
        Category::Analysis => &["host.db.ElementCollector", "addin.model.Parameter"],
    };

    apis.iter().map(|s| (*s).to_string()).collect()
}

/// Populated-section ratio: API list, hour estimate, effort, compatibility.
fn completeness_of(spec: &BuildSpec) -> f64 {
    let sections = [
        !spec.api_requirements.is_empty(),
        spec.development_hours > 0,
        (1..=100).contains(&spec.effort_estimate),
        spec.compatibility > 0.0,
    ];

    let filled = sections.iter().filter(|s| **s).count();
    filled as f64 / sections.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generate::SuggestionStatus;
    use crate::infra::config::ScoringConfig;

    fn suggestion(functionality: &str, category: Category) -> Suggestion {
        Suggestion {
            id: "idea-0001".to_string(),
            name: "Test Tool".to_string(),
            category,
            functionality: functionality.to_string(),
            description: String::new(),
            relevance_score: 0.7,
            innovation_score: 0.6,
            status: SuggestionStatus::Pending,
        }
    }

    #[test]
    fn classification_tiers() {
        assert_eq!(classify("predictive clash simulation"), Complexity::High);
        assert_eq!(classify("element selection helpers"), Complexity::Low);
        assert_eq!(classify("sheet renumbering utilities"), Complexity::Medium);
    }

    #[test]
    fn derived_spec_is_complete() {
        let cfg = ScoringConfig::default();
        let specifier = Specifier::new(&cfg);

        let spec = specifier.derive(&suggestion(
            "intelligent model element selection and matching",
            Category::SelectionFiltering,
        ));

        assert_eq!(spec.complexity_level, Complexity::Low);
        assert_eq!(spec.development_hours, 4);
        assert!(spec.external_dependencies.is_empty());
        assert_eq!(spec.completeness, 1.0);
    }

    #[test]
    fn high_complexity_pulls_in_external_dependencies() {
        let cfg = ScoringConfig::default();
        let specifier = Specifier::new(&cfg);

        let spec = specifier.derive(&suggestion(
            "engineering performance analysis and evaluation",
            Category::Analysis,
        ));

        assert_eq!(spec.complexity_level, Complexity::High);
        assert!(spec.api_requirements.iter().any(|a| a.starts_with("ext.")));
        assert_eq!(spec.external_dependencies, vec!["analytics-runtime"]);
        assert_eq!(spec.development_hours, 16);
    }
}
