//! Property registry: object, data and annotation property definitions.
//!
//! A property keeps its domain as an optional class expression, its range
//! either as a class expression (object properties) or a primitive datatype
//! (data properties), and the characteristic flags asserted on it. Several
//! domain or range classes are stored as one `IntersectionOf` expression.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::debug;

use crate::construct::{require_name, ClassExpression, Entity, EntityKind, IriHasher, Ontology, OWL};
use crate::datatype::{RDF_PLAIN_LITERAL, XSD};
use crate::error::{OntographError, Result};

// ------------- Characteristic -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Characteristic {
    Functional,
    InverseFunctional,
    Transitive,
    Symmetric,
    Asymmetric,
    Reflexive,
    Irreflexive,
}

impl Characteristic {
    pub const ALL: [Characteristic; 7] = [
        Self::Functional,
        Self::InverseFunctional,
        Self::Transitive,
        Self::Symmetric,
        Self::Asymmetric,
        Self::Reflexive,
        Self::Irreflexive,
    ];

    /// Case-insensitive; accepts `inverse-functional`, `inverse_functional` and `inversefunctional`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL.into_iter().find(|c| c.keyword() == key)
    }
    pub fn from_iri(iri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.owl_iri() == iri)
    }
    fn keyword(&self) -> &'static str {
        match self {
            Self::Functional => "functional",
            Self::InverseFunctional => "inversefunctional",
            Self::Transitive => "transitive",
            Self::Symmetric => "symmetric",
            Self::Asymmetric => "asymmetric",
            Self::Reflexive => "reflexive",
            Self::Irreflexive => "irreflexive",
        }
    }
    pub fn owl_iri(&self) -> String {
        let local = match self {
            Self::Functional => "FunctionalProperty",
            Self::InverseFunctional => "InverseFunctionalProperty",
            Self::Transitive => "TransitiveProperty",
            Self::Symmetric => "SymmetricProperty",
            Self::Asymmetric => "AsymmetricProperty",
            Self::Reflexive => "ReflexiveProperty",
            Self::Irreflexive => "IrreflexiveProperty",
        };
        format!("{OWL}{local}")
    }
}

// ------------- Datatype -------------
/// Primitive range of a data property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Datatype {
    Str,
    NormStr,
    LocStr,
    Int,
    Float,
    Bool,
    Date,
    Time,
    DateTime,
}

impl Datatype {
    pub const ALL: [Datatype; 9] = [
        Self::Str,
        Self::NormStr,
        Self::LocStr,
        Self::Int,
        Self::Float,
        Self::Bool,
        Self::Date,
        Self::Time,
        Self::DateTime,
    ];

    /// Looks a type name up in the fixed name table, after lowercasing and
    /// stripping an `xsd:` prefix. The xsd spellings `string`, `integer`,
    /// `decimal`, `double` and `boolean` are accepted as aliases.
    pub fn from_name(name: &str) -> Result<Self> {
        let lowered = name.trim().to_lowercase();
        let key = lowered.strip_prefix("xsd:").unwrap_or(&lowered);
        let datatype = match key {
            "str" | "string" => Self::Str,
            "normstr" => Self::NormStr,
            "locstr" => Self::LocStr,
            "int" | "integer" => Self::Int,
            "float" | "decimal" | "double" => Self::Float,
            "bool" | "boolean" => Self::Bool,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            _ => return Err(OntographError::UnsupportedDatatype(name.to_owned())),
        };
        Ok(datatype)
    }
    pub fn from_iri(iri: &str) -> Option<Self> {
        if iri == RDF_PLAIN_LITERAL {
            return Some(Self::LocStr);
        }
        let datatype = match iri.strip_prefix(XSD)? {
            "string" => Self::Str,
            "normalizedString" => Self::NormStr,
            "integer" | "int" | "long" => Self::Int,
            "decimal" | "double" | "float" => Self::Float,
            "boolean" => Self::Bool,
            "date" => Self::Date,
            "time" => Self::Time,
            "dateTime" => Self::DateTime,
            _ => return None,
        };
        Some(datatype)
    }
    pub fn iri(&self) -> String {
        match self {
            Self::LocStr => RDF_PLAIN_LITERAL.to_owned(),
            _ => format!("{XSD}{}", self.xsd_local()),
        }
    }
    fn xsd_local(&self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::NormStr => "normalizedString",
            Self::LocStr => "PlainLiteral",
            Self::Int => "integer",
            Self::Float => "decimal",
            Self::Bool => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "dateTime",
        }
    }
    /// Prefixed name used in the datatype vocabulary, e.g. `xsd:integer`.
    pub fn xsd_name(&self) -> String {
        match self {
            Self::LocStr => "rdf:PlainLiteral".to_owned(),
            _ => format!("xsd:{}", self.xsd_local()),
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.xsd_name())
    }
}

// ------------- Property records -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Object,
    Data,
    Annotation,
}

impl PropertyKind {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Self::Object => EntityKind::ObjectProperty,
            Self::Data => EntityKind::DataProperty,
            Self::Annotation => EntityKind::AnnotationProperty,
        }
    }
    pub fn from_entity_kind(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::ObjectProperty => Some(Self::Object),
            EntityKind::DataProperty => Some(Self::Data),
            EntityKind::AnnotationProperty => Some(Self::Annotation),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Range {
    Unspecified,
    Classes(ClassExpression),
    Datatype(Datatype),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRecord {
    kind: PropertyKind,
    domain: Option<ClassExpression>,
    range: Range,
    characteristics: BTreeSet<Characteristic>,
    super_properties: Vec<String>,
}

impl PropertyRecord {
    pub fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            domain: None,
            range: Range::Unspecified,
            characteristics: BTreeSet::new(),
            super_properties: Vec::new(),
        }
    }
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }
    pub fn domain(&self) -> Option<&ClassExpression> {
        self.domain.as_ref()
    }
    pub fn range(&self) -> &Range {
        &self.range
    }
    pub fn characteristics(&self) -> &BTreeSet<Characteristic> {
        &self.characteristics
    }
    pub fn super_properties(&self) -> &[String] {
        &self.super_properties
    }
    pub fn has(&self, characteristic: Characteristic) -> bool {
        self.characteristics.contains(&characteristic)
    }
    pub fn is_functional(&self) -> bool {
        self.has(Characteristic::Functional)
    }
    pub fn is_transitive(&self) -> bool {
        self.has(Characteristic::Transitive)
    }
    pub fn is_symmetric(&self) -> bool {
        self.has(Characteristic::Symmetric)
    }
    pub(crate) fn set_domain(&mut self, domain: ClassExpression) {
        self.domain = Some(domain);
    }
    pub(crate) fn set_range(&mut self, range: Range) {
        self.range = range;
    }
    pub(crate) fn add_characteristic(&mut self, characteristic: Characteristic) {
        self.characteristics.insert(characteristic);
    }
    pub(crate) fn add_super_property(&mut self, iri: &str) {
        if !self.super_properties.iter().any(|p| p == iri) {
            self.super_properties.push(iri.to_owned());
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PropertyKeeper {
    kept: HashMap<String, PropertyRecord, IriHasher>,
}

impl PropertyKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn keep(&mut self, iri: &str, record: PropertyRecord) {
        self.kept.insert(iri.to_owned(), record);
    }
    pub fn get(&self, iri: &str) -> Option<&PropertyRecord> {
        self.kept.get(iri)
    }
    pub(crate) fn get_mut(&mut self, iri: &str) -> Option<&mut PropertyRecord> {
        self.kept.get_mut(iri)
    }
    pub fn is_functional(&self, iri: &str) -> bool {
        self.get(iri).is_some_and(PropertyRecord::is_functional)
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

impl Ontology {
    /// Resolves every identifier as a named class, mapping the first miss through `missing`.
    fn resolve_classes(
        &self,
        identifiers: &[String],
        missing: fn(String) -> OntographError,
    ) -> Result<Option<ClassExpression>> {
        let mut iris = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            let iri = self
                .resolve_class(identifier)
                .ok_or_else(|| missing(identifier.clone()))?;
            if !iris.contains(&iri) {
                iris.push(iri);
            }
        }
        Ok(ClassExpression::intersection(iris))
    }

    fn keep_property(&mut self, name: &str, record: PropertyRecord) -> Result<String> {
        let iri = self.iri_for(name);
        if self.entities.contains(&iri) {
            return Err(OntographError::DuplicateIri(iri));
        }
        let kind = record.kind().entity_kind();
        self.properties.keep(&iri, record);
        self.entities.register(Entity::new(iri.as_str(), kind))?;
        Ok(iri)
    }

    pub fn create_object_property(
        &mut self,
        name: &str,
        domain: &[String],
        range: &[String],
        characteristics: &[String],
    ) -> Result<String> {
        let name = require_name(name)?;
        let domain = self.resolve_classes(domain, OntographError::DomainNotFound)?;
        let range = self.resolve_classes(range, OntographError::RangeNotFound)?;
        let mut record = PropertyRecord::new(PropertyKind::Object);
        if let Some(domain) = domain {
            record.set_domain(domain);
        }
        if let Some(range) = range {
            record.set_range(Range::Classes(range));
        }
        for flag in characteristics {
            match Characteristic::from_name(flag) {
                Some(
                    c @ (Characteristic::Functional
                    | Characteristic::Transitive
                    | Characteristic::Symmetric),
                ) => record.add_characteristic(c),
                _ => debug!(property = name, characteristic = %flag, "characteristic not recorded"),
            }
        }
        self.keep_property(name, record)
    }

    pub fn create_data_property(
        &mut self,
        name: &str,
        domain: &[String],
        datatype: &str,
        characteristics: &[String],
    ) -> Result<String> {
        let name = require_name(name)?;
        let datatype = Datatype::from_name(datatype)?;
        let domain = self.resolve_classes(domain, OntographError::DomainNotFound)?;
        let mut record = PropertyRecord::new(PropertyKind::Data);
        if let Some(domain) = domain {
            record.set_domain(domain);
        }
        record.set_range(Range::Datatype(datatype));
        for flag in characteristics {
            match Characteristic::from_name(flag) {
                Some(Characteristic::Functional) => {
                    record.add_characteristic(Characteristic::Functional)
                }
                _ => debug!(property = name, characteristic = %flag, "characteristic not recorded"),
            }
        }
        self.keep_property(name, record)
    }

    /// Annotation properties carry a domain but never characteristics.
    pub fn create_annotation_property(&mut self, name: &str, domain: &[String]) -> Result<String> {
        let name = require_name(name)?;
        let blank: Vec<String> = domain
            .iter()
            .filter(|d| !d.trim().is_empty())
            .cloned()
            .collect();
        let domain = self.resolve_classes(&blank, OntographError::DomainNotFound)?;
        let mut record = PropertyRecord::new(PropertyKind::Annotation);
        if let Some(domain) = domain {
            record.set_domain(domain);
        }
        self.keep_property(name, record)
    }

    /// Distinct data-property ranges in use.
    pub fn datatypes_in_use(&self) -> BTreeSet<Datatype> {
        self.entities
            .of_kind(EntityKind::DataProperty)
            .filter_map(|e| match self.properties.get(e.iri())?.range() {
                Range::Datatype(datatype) => Some(*datatype),
                _ => None,
            })
            .collect()
    }
}
