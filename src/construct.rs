use std::sync::Arc;

// other keepers use HashMap with a fast non-cryptographic hasher
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::HashMap;

// used to print out readable forms of a construct
use std::fmt;

// our own stuff that we need
use crate::error::{OntographError, Result};
use crate::hierarchy::ClassKeeper;
use crate::individual::IndividualKeeper;
use crate::registry::PropertyKeeper;

pub type IriHasher = BuildHasherDefault<SeaHasher>;

pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
pub const THING_IRI: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const DEFAULT_ONTOLOGY_IRI: &str = "http://example.org/ontology";

/// The last segment of an IRI, after its final `#` or `/`.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

// ------------- Entity -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Class,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    Individual,
}

impl EntityKind {
    pub fn is_class(&self) -> bool {
        matches!(self, Self::Class)
    }
    pub fn is_individual(&self) -> bool {
        matches!(self, Self::Individual)
    }
    pub fn is_object_property(&self) -> bool {
        matches!(self, Self::ObjectProperty)
    }
    pub fn is_data_property(&self) -> bool {
        matches!(self, Self::DataProperty)
    }
    pub fn is_annotation_property(&self) -> bool {
        matches!(self, Self::AnnotationProperty)
    }
    pub fn is_property(&self) -> bool {
        self.is_object_property() || self.is_data_property() || self.is_annotation_property()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self {
            Self::Class => "class",
            Self::ObjectProperty => "object property",
            Self::DataProperty => "data property",
            Self::AnnotationProperty => "annotation property",
            Self::Individual => "individual",
        };
        f.write_str(kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    iri: String,
    kind: EntityKind,
    label: Option<String>,
    comment: Option<String>,
}

impl Entity {
    pub fn new(iri: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            iri: iri.into(),
            kind,
            label: None,
            comment: None,
        }
    }
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }
    // Entities are immutable once kept, hence getters only.
    pub fn iri(&self) -> &str {
        &self.iri
    }
    pub fn name(&self) -> &str {
        local_name(&self.iri)
    }
    pub fn kind(&self) -> EntityKind {
        self.kind
    }
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} <{}>", self.kind, self.iri)
    }
}

/// Owns every entity of a graph and answers identifier lookups.
///
/// Entities are kept in registration order, which is the order used whenever
/// more than one entity matches an identifier.
#[derive(Clone, Debug, Default)]
pub struct EntityKeeper {
    kept: Vec<Arc<Entity>>,
    index: HashMap<String, usize, IriHasher>,
}

impl EntityKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn register(&mut self, entity: Entity) -> Result<Arc<Entity>> {
        if self.index.contains_key(entity.iri()) {
            return Err(OntographError::DuplicateIri(entity.iri().to_owned()));
        }
        let kept = Arc::new(entity);
        self.index.insert(kept.iri().to_owned(), self.kept.len());
        self.kept.push(Arc::clone(&kept));
        Ok(kept)
    }
    pub fn get(&self, iri: &str) -> Option<&Arc<Entity>> {
        self.index.get(iri).map(|&i| &self.kept[i])
    }
    pub fn contains(&self, iri: &str) -> bool {
        self.index.contains_key(iri)
    }
    /// Finds an entity by exact IRI, then by IRI suffix, then by exact label.
    pub fn lookup(&self, identifier: &str) -> Option<&Arc<Entity>> {
        if identifier.is_empty() {
            return None;
        }
        self.get(identifier)
            .or_else(|| self.kept.iter().find(|e| e.iri().ends_with(identifier)))
            .or_else(|| self.kept.iter().find(|e| e.label() == Some(identifier)))
    }
    pub fn resolve(&self, identifier: &str) -> Result<Arc<Entity>> {
        self.lookup(identifier)
            .map(Arc::clone)
            .ok_or_else(|| OntographError::NotFound(identifier.to_owned()))
    }
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.kept.iter()
    }
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Arc<Entity>> {
        self.kept.iter().filter(move |e| e.kind() == kind)
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

// ------------- Class expressions -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassExpression {
    Named(String),
    IntersectionOf(Vec<ClassExpression>),
    UnionOf(Vec<ClassExpression>),
    ComplementOf(Box<ClassExpression>),
}

impl ClassExpression {
    pub fn named(iri: impl Into<String>) -> Self {
        Self::Named(iri.into())
    }
    /// A single class stays named; several become their intersection.
    pub fn intersection(mut iris: Vec<String>) -> Option<Self> {
        match iris.len() {
            0 => None,
            1 => iris.pop().map(Self::Named),
            _ => Some(Self::IntersectionOf(iris.into_iter().map(Self::Named).collect())),
        }
    }
    pub fn as_named(&self) -> Option<&str> {
        match self {
            Self::Named(iri) => Some(iri),
            _ => None,
        }
    }
    pub fn is_named(&self) -> bool {
        self.as_named().is_some()
    }
}

// ------------- Ontology -------------
/// The graph aggregate: one entity table and the three stores that hang off it.
///
/// Stores refer to entities by IRI only, so cloning an ontology yields a fully
/// independent copy that a transaction can stage changes on.
#[derive(Clone, Debug)]
pub struct Ontology {
    iri: String,
    base_iri: String,
    pub(crate) entities: EntityKeeper,
    pub(crate) classes: ClassKeeper,
    pub(crate) properties: PropertyKeeper,
    pub(crate) individuals: IndividualKeeper,
}

impl Ontology {
    pub fn new(iri: &str) -> Self {
        let iri = iri.trim_end_matches('#').to_owned();
        let base_iri = if iri.ends_with('/') {
            iri.clone()
        } else {
            format!("{iri}#")
        };
        Self {
            iri,
            base_iri,
            entities: EntityKeeper::new(),
            classes: ClassKeeper::new(),
            properties: PropertyKeeper::new(),
            individuals: IndividualKeeper::new(),
        }
    }
    pub fn iri(&self) -> &str {
        &self.iri
    }
    pub fn base_iri(&self) -> &str {
        &self.base_iri
    }
    /// The IRI a newly created entity with this name receives.
    pub fn iri_for(&self, name: &str) -> String {
        format!("{}{}", self.base_iri, name)
    }
    pub fn entities(&self) -> &EntityKeeper {
        &self.entities
    }
    pub fn classes(&self) -> &ClassKeeper {
        &self.classes
    }
    pub fn properties(&self) -> &PropertyKeeper {
        &self.properties
    }
    pub fn individuals(&self) -> &IndividualKeeper {
        &self.individuals
    }
    pub fn resolve(&self, identifier: &str) -> Result<Arc<Entity>> {
        self.entities.resolve(identifier)
    }
    /// Resolves an identifier and keeps it only if the entity is of the given kind.
    pub fn resolve_kind(&self, identifier: &str, kind: EntityKind) -> Option<Arc<Entity>> {
        self.entities
            .lookup(identifier)
            .filter(|e| e.kind() == kind)
            .map(Arc::clone)
    }
}

/// Rejects names that are empty or cannot end an IRI, before anything is resolved.
pub(crate) fn require_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OntographError::InvalidRequest("a name is required".to_owned()));
    }
    if let Some(c) = name.chars().find(|c| !is_name_char(*c)) {
        return Err(OntographError::InvalidRequest(format!(
            "'{name}' cannot be used in an IRI, it contains {c:?}"
        )));
    }
    Ok(name)
}

// separators and characters an IRI fragment may not hold
fn is_name_char(c: char) -> bool {
    !(c.is_whitespace()
        || c.is_control()
        || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`' | '#' | '/' | '?' | '%'))
}
