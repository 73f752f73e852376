use crate::predicate::Predicate;
use crate::store::FactStore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

fn id_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(
            r"^([^.\s]+)\.(def|ax|prop|lemma|post|expl)\.(\d+)(?:\.(proof|corollary|note|explanation|lemma)(\d+)?)?$",
        )
        .expect("element id grammar compiles")
    })
}

/// Identifier of one logical unit of the text (e.g. `I.prop.11.proof2`).
///
/// Any string is accepted; the grammar is only consulted through [`IdParts`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parts(&self) -> Option<IdParts> {
        IdParts::parse(&self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Element category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Definition,
    Axiom,
    Proposition,
    Proof,
    Corollary,
    Note,
    Lemma,
    Postulate,
    Explanation,
}

impl Category {
    /// Category from an id segment (`def`, `prop`, `proof`, ...)
    pub fn from_abbreviation(abbr: &str) -> Option<Self> {
        let category = match abbr {
            "def" => Category::Definition,
            "ax" => Category::Axiom,
            "prop" => Category::Proposition,
            "lemma" => Category::Lemma,
            "post" => Category::Postulate,
            "expl" | "explanation" => Category::Explanation,
            "proof" => Category::Proof,
            "corollary" => Category::Corollary,
            "note" => Category::Note,
            _ => return None,
        };
        Some(category)
    }

    /// Category from an RDF class name (`Definition`, `Proof`, ...)
    pub fn from_class(class: &str) -> Option<Self> {
        let category = match class {
            "Definition" => Category::Definition,
            "Axiom" => Category::Axiom,
            "Proposition" => Category::Proposition,
            "Proof" => Category::Proof,
            "Corollary" => Category::Corollary,
            "Note" => Category::Note,
            "Lemma" => Category::Lemma,
            "Postulate" => Category::Postulate,
            "Explanation" => Category::Explanation,
            _ => return None,
        };
        Some(category)
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Category::Definition => "Definition",
            Category::Axiom => "Axiom",
            Category::Proposition => "Proposition",
            Category::Proof => "Proof",
            Category::Corollary => "Corollary",
            Category::Note => "Note",
            Category::Lemma => "Lemma",
            Category::Postulate => "Postulate",
            Category::Explanation => "Explanation",
        }
    }
}

/// Structured view of an id matching `<part>.<category>.<number>[.<sub>[<index>]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParts {
    pub part: String,
    pub category: Category,
    pub number: u32,
    pub sub: Option<(Category, Option<u32>)>,
}

impl IdParts {
    pub fn parse(id: &str) -> Option<Self> {
        let caps = id_grammar().captures(id)?;
        let category = Category::from_abbreviation(&caps[2])?;
        let number = caps[3].parse().ok()?;
        let sub = match caps.get(4) {
            Some(m) => {
                let sub_category = Category::from_abbreviation(m.as_str())?;
                let index = match caps.get(5) {
                    Some(idx) => Some(idx.as_str().parse().ok()?),
                    None => None,
                };
                Some((sub_category, index))
            }
            None => None,
        };

        Some(Self {
            part: caps[1].to_string(),
            category,
            number,
            sub,
        })
    }

    /// Category of the element itself (the sub-element category when present)
    pub fn element_category(&self) -> Category {
        self.sub.map(|(c, _)| c).unwrap_or(self.category)
    }

    /// Id of the owning top-level element, e.g. `I.prop.11` for `I.prop.11.proof2`
    pub fn owner(&self) -> String {
        let abbr = match self.category {
            Category::Definition => "def",
            Category::Axiom => "ax",
            Category::Proposition => "prop",
            Category::Lemma => "lemma",
            Category::Postulate => "post",
            _ => "expl",
        };
        format!("{}.{}.{}", self.part, abbr, self.number)
    }

    pub fn label(&self) -> String {
        let mut label = format!(
            "Part {}, {} {}",
            self.part,
            self.category.class_name(),
            self.number
        );
        if let Some((sub, index)) = self.sub {
            label.push_str(", ");
            label.push_str(sub.class_name());
            if let Some(index) = index {
                label.push_str(&format!(" {index}"));
            }
        }
        label
    }
}

/// One logical unit of the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub category: Category,
    /// Element this one elaborates (lookup relation only)
    pub parent_id: Option<ElementId>,
}

impl Element {
    pub fn new(id: impl Into<ElementId>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<ElementId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Infer category and parent from the id grammar
    pub fn from_id(id: &str) -> Option<Self> {
        let parts = IdParts::parse(id)?;
        let parent_id = parts.sub.map(|_| ElementId::new(parts.owner()));
        Some(Self {
            id: ElementId::from(id),
            category: parts.element_category(),
            parent_id,
        })
    }
}

/// Read-only snapshot of the elements known in a session
#[derive(Debug, Clone, Default)]
pub struct ElementCatalog {
    elements: HashMap<ElementId, Element>,
}

impl ElementCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let mut catalog = Self::new();
        for element in elements {
            catalog.insert(element);
        }
        catalog
    }

    /// Build a catalog from `(x a Class)` statements, falling back to the id grammar
    /// for subjects whose class is not an element category.
    pub fn from_store(store: &FactStore) -> Self {
        let mut catalog = Self::new();
        for statement in store.matching(None, Some(Predicate::Type), None) {
            let id = statement.subject.as_str();
            let parsed = Element::from_id(id);
            let element = match Category::from_class(statement.object.as_str()) {
                Some(category) => Element {
                    id: statement.subject.clone(),
                    category,
                    parent_id: parsed.and_then(|e| e.parent_id),
                },
                None => match parsed {
                    Some(element) => element,
                    None => continue,
                },
            };
            catalog.elements.entry(element.id.clone()).or_insert(element);
        }
        log::debug!("Catalog built from store: {} elements", catalog.len());
        catalog
    }

    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id.clone(), element);
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Category from the catalog, else from the id grammar
    pub fn category_of(&self, id: &str) -> Option<Category> {
        self.get(id)
            .map(|e| e.category)
            .or_else(|| IdParts::parse(id).map(|p| p.element_category()))
    }

    /// Human label; unknown or malformed ids are returned as-is
    pub fn label(&self, id: &str) -> String {
        if !self.contains(id) {
            return id.to_string();
        }
        IdParts::parse(id)
            .map(|p| p.label())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }
}
