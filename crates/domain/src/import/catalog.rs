//! Modifier catalog: resolves pasted modifier text to catalog entries.
//!
//! Built once by the caller and passed by reference; there is no global cache.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::error::DomainError;
use crate::idol::ModifierType;
use crate::ids::ModifierId;

/// Lowest token similarity accepted by the fuzzy fallback
pub const MIN_SIMILARITY: f64 = 0.6;

// Rolled ranges such as "(60-70)" collapse into the number they annotate
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*[+-]?\d+(?:\.\d+)?\s*-\s*[+-]?\d+(?:\.\d+)?\s*\)").expect("valid regex")
});
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]?(?:\d+(?:\.\d+)?|#)").expect("valid regex"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// One catalog entry, with `#` standing in for the rolled value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierDefinition {
    pub id: ModifierId,
    pub text: String,
    #[serde(rename = "type")]
    pub mod_type: ModifierType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanic: Option<String>,
}

/// Drop advanced-format roll ranges: "+65(60-70)%" becomes "+65%".
pub(crate) fn strip_roll_ranges(text: &str) -> Cow<'_, str> {
    RANGE_RE.replace_all(text, "")
}

/// Lowercased text with every number (or `#`) replaced by `#`.
pub fn normalize_modifier_text(text: &str) -> String {
    let text = text.trim().trim_end_matches("(implicit)").trim();
    let without_ranges = strip_roll_ranges(text);
    let numbers = NUMBER_RE.replace_all(&without_ranges, "#");
    SPACE_RE
        .replace_all(numbers.trim(), " ")
        .to_lowercase()
}

fn tokens(normalized: &str) -> HashSet<&str> {
    normalized.split(' ').filter(|t| !t.is_empty()).collect()
}

/// Jaccard similarity over whitespace tokens
fn similarity(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[derive(Debug, Clone, Default)]
pub struct ModifierCatalog {
    definitions: Vec<ModifierDefinition>,
    normalized: Vec<String>,
    by_template: HashMap<String, Vec<usize>>,
}

impl ModifierCatalog {
    pub fn new(definitions: Vec<ModifierDefinition>) -> Self {
        let normalized: Vec<String> = definitions
            .iter()
            .map(|definition| normalize_modifier_text(&definition.text))
            .collect();
        let mut by_template: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, template) in normalized.iter().enumerate() {
            by_template.entry(template.clone()).or_default().push(index);
        }
        Self {
            definitions,
            normalized,
            by_template,
        }
    }

    /// Load from a JSON array of definitions.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let definitions: Vec<ModifierDefinition> = serde_json::from_str(json)
            .map_err(|e| DomainError::parse(format!("Invalid modifier catalog: {}", e)))?;
        Ok(Self::new(definitions))
    }

    pub fn definitions(&self) -> &[ModifierDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, id: &ModifierId) -> Option<&ModifierDefinition> {
        self.definitions.iter().find(|definition| &definition.id == id)
    }

    /// Resolve pasted modifier text.
    ///
    /// An exact template match wins; otherwise the most similar template at
    /// or above `MIN_SIMILARITY`. When several entries qualify, one whose type
    /// equals `hint` is preferred.
    pub fn resolve(&self, text: &str, hint: Option<ModifierType>) -> Option<&ModifierDefinition> {
        let normalized = normalize_modifier_text(text);
        if let Some(indices) = self.by_template.get(&normalized) {
            let index = indices
                .iter()
                .copied()
                .find(|&i| Some(self.definitions[i].mod_type) == hint)
                .or_else(|| indices.first().copied())?;
            return Some(&self.definitions[index]);
        }

        let wanted = tokens(&normalized);
        let mut best: Option<(usize, f64)> = None;
        for (index, template) in self.normalized.iter().enumerate() {
            let mut score = similarity(&wanted, &tokens(template));
            if score < MIN_SIMILARITY {
                continue;
            }
            // Break ties towards the hinted type
            if Some(self.definitions[index].mod_type) == hint {
                score += f64::EPSILON;
            }
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((index, score)),
            }
        }
        best.map(|(index, _)| &self.definitions[index])
    }
}
