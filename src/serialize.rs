//! Read-only views of a graph, shaped for callers.
//!
//! Nothing here mutates the graph. A view entry that cannot be rendered is
//! replaced by an error marker so one bad entry never hides the rest of a
//! collection.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::warn;

use crate::construct::{local_name, ClassExpression, Entity, EntityKind, Ontology};
use crate::datatype::{Literal, Value};
use crate::error::{OntographError, Result};
use crate::hierarchy::ClassNode;
use crate::individual::AnnotationValue;
use crate::registry::{PropertyRecord, Range};

/// Stands in for a value that could not be rendered.
pub const ERROR_MARKER: &str = "<unreadable>";

/// Datatypes always offered to callers, whatever the graph uses.
pub const BASE_DATATYPES: [&str; 5] = [
    "xsd:string",
    "xsd:integer",
    "xsd:float",
    "xsd:boolean",
    "xsd:dateTime",
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntitySummary {
    pub name: String,
    pub iri: String,
    pub comment: String,
}

/// A rendered assertion value; numbers and booleans keep their JSON type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RenderedValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl From<&Literal> for RenderedValue {
    fn from(literal: &Literal) -> Self {
        match literal.value() {
            Value::Integer(i) => Self::Integer(*i),
            Value::Float(x) => Self::Float(*x),
            Value::Boolean(b) => Self::Boolean(*b),
            _ => Self::Text(literal.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndividualSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub properties: BTreeMap<String, Vec<RenderedValue>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertySummary {
    pub name: String,
    pub iri: String,
    pub label: Option<String>,
    pub domain: Vec<String>,
    pub range: Vec<String>,
    pub is_functional: bool,
    pub is_transitive: bool,
    pub is_symmetric: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassTreeView {
    pub classes: Vec<ClassNode>,
    pub classes_count: usize,
}

/// Everything a caller needs after loading a graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub classes: Vec<ClassNode>,
    pub classes_count: usize,
    pub object_properties: Vec<PropertySummary>,
    pub data_properties: Vec<PropertySummary>,
    pub annotation_properties: Vec<PropertySummary>,
    pub individuals: Vec<IndividualSummary>,
    pub datatypes: Vec<String>,
}

/// Renders a class expression with one formatter per combinator.
pub fn format_expression(expression: &ClassExpression) -> String {
    let members = |members: &[ClassExpression]| {
        members
            .iter()
            .map(format_expression)
            .collect::<Vec<_>>()
            .join(", ")
    };
    match expression {
        ClassExpression::Named(iri) => local_name(iri).to_owned(),
        ClassExpression::IntersectionOf(m) => format!("IntersectionOf({})", members(m)),
        ClassExpression::UnionOf(m) => format!("UnionOf({})", members(m)),
        ClassExpression::ComplementOf(inner) => format!("ComplementOf({})", format_expression(inner)),
    }
}

// an intersection is listed member by member, anything else as one entry
fn expression_entries(expression: &ClassExpression) -> Vec<String> {
    match expression {
        ClassExpression::IntersectionOf(members) => members.iter().map(format_expression).collect(),
        other => vec![format_expression(other)],
    }
}

pub fn entity_summary(entity: &Entity) -> EntitySummary {
    EntitySummary {
        name: entity.name().to_owned(),
        iri: entity.iri().to_owned(),
        comment: entity.comment().unwrap_or_default().to_owned(),
    }
}

fn property_record<'o>(ontology: &'o Ontology, entity: &Entity) -> Result<&'o PropertyRecord> {
    ontology
        .properties()
        .get(entity.iri())
        .ok_or_else(|| OntographError::NotFound(entity.iri().to_owned()))
}

pub fn property_summary(ontology: &Ontology, entity: &Entity) -> PropertySummary {
    let mut summary = PropertySummary {
        name: entity.name().to_owned(),
        iri: entity.iri().to_owned(),
        label: entity.label().map(str::to_owned),
        domain: Vec::new(),
        range: Vec::new(),
        is_functional: false,
        is_transitive: false,
        is_symmetric: false,
        error: None,
    };
    match property_record(ontology, entity) {
        Ok(record) => {
            summary.domain = record.domain().map(expression_entries).unwrap_or_default();
            summary.range = match record.range() {
                Range::Classes(range) => expression_entries(range),
                Range::Datatype(datatype) => vec![datatype.xsd_name()],
                Range::Unspecified => Vec::new(),
            };
            summary.is_functional = record.is_functional();
            summary.is_transitive = record.is_transitive();
            summary.is_symmetric = record.is_symmetric();
        }
        Err(e) => {
            warn!(property = entity.iri(), error = %e, "property could not be rendered");
            summary.error = Some(e.to_string());
        }
    }
    summary
}

pub fn individual_summary(ontology: &Ontology, entity: &Entity) -> IndividualSummary {
    let mut summary = IndividualSummary {
        name: entity.name().to_owned(),
        types: Vec::new(),
        properties: BTreeMap::new(),
    };
    let Some(record) = ontology.individuals().get(entity.iri()) else {
        warn!(individual = entity.iri(), "individual could not be rendered");
        summary.types.push(ERROR_MARKER.to_owned());
        return summary;
    };
    summary.types = record
        .types()
        .iter()
        .filter_map(ClassExpression::as_named)
        .map(|iri| local_name(iri).to_owned())
        .collect();

    // properties are keyed by name unless two of them share one
    let mut named: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for property in record
        .data()
        .keys()
        .chain(record.objects().keys())
        .chain(record.annotations().keys())
    {
        named
            .entry(local_name(property))
            .or_default()
            .insert(property.as_str());
    }
    let mut render = |property: &str, values: Result<Vec<RenderedValue>>| {
        let name = match named.get(local_name(property)) {
            Some(iris) if iris.len() > 1 => property.to_owned(),
            _ => local_name(property).to_owned(),
        };
        let values = values.unwrap_or_else(|e| {
            warn!(individual = entity.iri(), property, error = %e, "property could not be rendered");
            vec![RenderedValue::Text(ERROR_MARKER.to_owned())]
        });
        summary.properties.entry(name).or_default().extend(values);
    };
    for (property, literals) in record.data() {
        let values = known(ontology, property).map(|_| literals.iter().map(RenderedValue::from).collect());
        render(property, values);
    }
    for (property, targets) in record.objects() {
        let values = known(ontology, property).map(|_| {
            targets
                .iter()
                .map(|t| RenderedValue::Text(local_name(t).to_owned()))
                .collect()
        });
        render(property, values);
    }
    for (property, annotations) in record.annotations() {
        let values = known(ontology, property).map(|_| {
            annotations
                .iter()
                .map(|value| match value {
                    AnnotationValue::Literal(literal) => RenderedValue::from(literal),
                    AnnotationValue::Resource(iri) => RenderedValue::Text(local_name(iri).to_owned()),
                    AnnotationValue::Expression(expression) => {
                        RenderedValue::Text(format_expression(expression))
                    }
                })
                .collect()
        });
        render(property, values);
    }
    summary
}

fn known<'o>(ontology: &'o Ontology, property: &str) -> Result<&'o Entity> {
    ontology
        .entities()
        .get(property)
        .map(|e| &**e)
        .filter(|e| e.kind().is_property())
        .ok_or_else(|| OntographError::NotFound(property.to_owned()))
}

impl Ontology {
    pub fn class_summaries(&self) -> Vec<EntitySummary> {
        self.entities()
            .of_kind(EntityKind::Class)
            .map(|e| entity_summary(e))
            .collect()
    }
    pub fn property_summaries(&self, kind: EntityKind) -> Vec<PropertySummary> {
        self.entities()
            .of_kind(kind)
            .map(|e| property_summary(self, e))
            .collect()
    }
    pub fn individual_summaries(&self) -> Vec<IndividualSummary> {
        self.entities()
            .of_kind(EntityKind::Individual)
            .map(|e| individual_summary(self, e))
            .collect()
    }
    pub fn class_tree_view(&self) -> ClassTreeView {
        ClassTreeView {
            classes: self.class_tree(),
            classes_count: self.classes().len(),
        }
    }
    /// The fixed base vocabulary plus every data-property range in use.
    pub fn datatype_vocabulary(&self) -> Vec<String> {
        let mut vocabulary: BTreeSet<String> =
            BASE_DATATYPES.iter().map(|d| d.to_string()).collect();
        vocabulary.extend(self.datatypes_in_use().iter().map(|d| d.xsd_name()));
        vocabulary.into_iter().collect()
    }
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            classes: self.class_tree(),
            classes_count: self.classes().len(),
            object_properties: self.property_summaries(EntityKind::ObjectProperty),
            data_properties: self.property_summaries(EntityKind::DataProperty),
            annotation_properties: self.property_summaries(EntityKind::AnnotationProperty),
            individuals: self.individual_summaries(),
            datatypes: self.datatype_vocabulary(),
        }
    }
}
