//! The category / label / tag enumeration used to classify records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TaxonomyError;

/// Sentinel category assigned when the model gives none.
pub const UNDEFINED_CATEGORY: &str = "undefined";

/// Read-only classification table.
///
/// Values are stored lowercase; membership tests trim and lowercase the
/// candidate first. A label may sit in more than one group (`ui` is both a
/// dev and a design label), so label validity is membership in the union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxonomyDef", into = "TaxonomyDef")]
pub struct Taxonomy {
    version: String,
    categories: Vec<String>,
    label_groups: IndexMap<String, Vec<String>>,
    tags: Vec<String>,
    all_labels: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct TaxonomyDef {
    version: String,
    categories: Vec<String>,
    labels: IndexMap<String, Vec<String>>,
    tags: Vec<String>,
}

impl TryFrom<TaxonomyDef> for Taxonomy {
    type Error = TaxonomyError;

    fn try_from(def: TaxonomyDef) -> Result<Self, Self::Error> {
        Taxonomy::new(def.version, def.categories, def.labels, def.tags)
    }
}

impl From<Taxonomy> for TaxonomyDef {
    fn from(t: Taxonomy) -> Self {
        Self {
            version: t.version,
            categories: t.categories,
            labels: t.label_groups,
            tags: t.tags,
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl Taxonomy {
    /// Build a taxonomy, checking that every label group names a category.
    pub fn new(
        version: impl Into<String>,
        categories: Vec<String>,
        label_groups: IndexMap<String, Vec<String>>,
        tags: Vec<String>,
    ) -> Result<Self, TaxonomyError> {
        let categories: Vec<String> = categories.iter().map(|c| normalize(c)).collect();
        if categories.is_empty() {
            return Err(TaxonomyError::Empty("categories"));
        }
        if tags.is_empty() {
            return Err(TaxonomyError::Empty("tags"));
        }

        let mut groups = IndexMap::with_capacity(label_groups.len());
        for (group, labels) in label_groups {
            let group = normalize(&group);
            if !categories.contains(&group) {
                return Err(TaxonomyError::UnknownGroup(group));
            }
            groups.insert(group, labels.iter().map(|l| normalize(l)).collect::<Vec<_>>());
        }

        let all_labels = union_of(&groups);
        if all_labels.is_empty() {
            return Err(TaxonomyError::Empty("labels"));
        }

        Ok(Self {
            version: version.into(),
            categories,
            label_groups: groups,
            tags: tags.iter().map(|t| normalize(t)).collect(),
            all_labels,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Label groups in declaration order, keyed by category.
    pub fn label_groups(&self) -> &IndexMap<String, Vec<String>> {
        &self.label_groups
    }

    /// Union of all label groups, first occurrence order.
    pub fn all_labels(&self) -> &[String] {
        &self.all_labels
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Canonical spelling of `value` if it is a category.
    pub fn category(&self, value: &str) -> Option<&str> {
        find(&self.categories, value)
    }

    pub fn label(&self, value: &str) -> Option<&str> {
        find(&self.all_labels, value)
    }

    pub fn tag(&self, value: &str) -> Option<&str> {
        find(&self.tags, value)
    }

    pub fn is_category(&self, value: &str) -> bool {
        self.category(value).is_some()
    }

    pub fn is_label(&self, value: &str) -> bool {
        self.label(value).is_some()
    }

    pub fn is_tag(&self, value: &str) -> bool {
        self.tag(value).is_some()
    }
}

fn find<'a>(values: &'a [String], candidate: &str) -> Option<&'a str> {
    let candidate = normalize(candidate);
    values.iter().find(|v| **v == candidate).map(String::as_str)
}

fn union_of(groups: &IndexMap<String, Vec<String>>) -> Vec<String> {
    let mut all: Vec<String> = Vec::new();
    for label in groups.values().flatten() {
        if !all.contains(label) {
            all.push(label.clone());
        }
    }
    all
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for Taxonomy {
    /// The directory's production table.
    fn default() -> Self {
        let mut labels = IndexMap::new();
        labels.insert("dev".to_string(), owned(&["frontend", "backend", "devops", "ui"]));
        labels.insert(
            "design".to_string(),
            owned(&[
                "ui",
                "graphic",
                "systems",
                "kits",
                "icons",
                "gradients",
                "tools",
                "typography",
                "fonts",
                "patterns",
                "showcases",
            ]),
        );
        labels.insert(
            "learning".to_string(),
            owned(&["courses", "tutorials", "blogs", "articles", "studies", "docs", "references"]),
        );
        labels.insert("media".to_string(), owned(&["stock", "images", "videos", "editing"]));

        let categories = owned(&["dev", "design", "learning", "media"]);
        let tags = owned(&[
            "libraries",
            "frameworks",
            "components",
            "state",
            "databases",
            "api",
            "ci/cd",
            "deployment",
            "monitoring",
            "design systems",
            "ui kits",
            "icons",
            "gradients",
            "tools",
            "reactjs",
            "nextjs",
            "tailwindcss",
            "figma",
        ]);

        let all_labels = union_of(&labels);

        Self {
            version: "2024-06".to_string(),
            categories,
            label_groups: labels,
            tags,
            all_labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_shape() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.categories().len(), 4);
        assert_eq!(taxonomy.tags().len(), 18);
        // "ui" is listed under dev and design but counted once
        assert_eq!(taxonomy.all_labels().iter().filter(|l| *l == "ui").count(), 1);
        assert_eq!(taxonomy.all_labels().len(), 25);
    }

    #[test]
    fn test_membership_is_case_normalized() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.is_tag("UI Kits"));
        assert_eq!(taxonomy.tag(" Design Systems "), Some("design systems"));
        assert!(taxonomy.is_label("Frontend"));
        assert!(taxonomy.is_category("MEDIA"));
        assert!(!taxonomy.is_tag("ui-kit"));
        assert!(!taxonomy.is_category(UNDEFINED_CATEGORY));
    }

    #[test]
    fn test_new_rejects_orphan_label_group() {
        let mut labels = IndexMap::new();
        labels.insert("audio".to_string(), vec!["podcasts".to_string()]);
        let result = Taxonomy::new("test", vec!["dev".into()], labels, vec!["api".into()]);
        assert_eq!(result, Err(TaxonomyError::UnknownGroup("audio".into())));
    }

    #[test]
    fn test_deserialize_from_json() {
        let taxonomy: Taxonomy = serde_json::from_value(serde_json::json!({
            "version": "custom",
            "categories": ["Dev"],
            "labels": {"dev": ["Frontend"]},
            "tags": ["API"]
        }))
        .unwrap();

        assert_eq!(taxonomy.version(), "custom");
        assert_eq!(taxonomy.categories(), ["dev"]);
        assert_eq!(taxonomy.all_labels(), ["frontend"]);
        assert!(taxonomy.is_tag("api"));
    }

    #[test]
    fn test_default_round_trips_through_json() {
        let taxonomy = Taxonomy::default();
        let json = serde_json::to_value(&taxonomy).unwrap();
        let back: Taxonomy = serde_json::from_value(json).unwrap();
        assert_eq!(back, taxonomy);
    }
}
