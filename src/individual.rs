//! Individual store: type assertions and property-value assertions per individual.
//!
//! Creating an individual is all-or-nothing only for the individual itself. Every
//! further assertion is attempted on its own; one that names an unknown entity,
//! an entity of the wrong kind or carries no value is skipped and recorded in the
//! [`IndividualReport`] instead of failing the whole operation.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tracing::{debug, info};

use crate::construct::{require_name, ClassExpression, Entity, EntityKind, IriHasher, Ontology};
use crate::datatype::{coerce, Literal};
use crate::error::{OntographError, Result};

/// The value of an annotation assertion.
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationValue {
    Literal(Literal),
    Resource(String),
    Expression(ClassExpression),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndividualRecord {
    types: Vec<ClassExpression>,
    data: BTreeMap<String, Vec<Literal>>,
    objects: BTreeMap<String, Vec<String>>,
    annotations: BTreeMap<String, Vec<AnnotationValue>>,
    same_as: Vec<String>,
    different_from: Vec<String>,
}

impl IndividualRecord {
    pub fn new(types: Vec<ClassExpression>) -> Self {
        Self {
            types,
            ..Self::default()
        }
    }
    pub fn types(&self) -> &[ClassExpression] {
        &self.types
    }
    pub fn data(&self) -> &BTreeMap<String, Vec<Literal>> {
        &self.data
    }
    pub fn objects(&self) -> &BTreeMap<String, Vec<String>> {
        &self.objects
    }
    pub fn annotations(&self) -> &BTreeMap<String, Vec<AnnotationValue>> {
        &self.annotations
    }
    pub fn same_as(&self) -> &[String] {
        &self.same_as
    }
    pub fn different_from(&self) -> &[String] {
        &self.different_from
    }
    pub fn targets(&self, property: &str) -> &[String] {
        self.objects.get(property).map(Vec::as_slice).unwrap_or_default()
    }
    pub(crate) fn add_type(&mut self, expression: ClassExpression) {
        if !self.types.contains(&expression) {
            self.types.push(expression);
        }
    }
    /// A functional property holds at most one value, so a new one replaces it.
    pub(crate) fn assert_data(&mut self, property: &str, literal: Literal, functional: bool) {
        let values = self.data.entry(property.to_owned()).or_default();
        if functional {
            values.clear();
        }
        values.push(literal);
    }
    pub(crate) fn assert_object(&mut self, property: &str, target: &str, functional: bool) {
        let targets = self.objects.entry(property.to_owned()).or_default();
        if functional {
            targets.clear();
        }
        targets.push(target.to_owned());
    }
    /// Drops the first occurrence of `target`; false if there was none.
    pub(crate) fn retract_object(&mut self, property: &str, target: &str) -> bool {
        let Some(targets) = self.objects.get_mut(property) else {
            return false;
        };
        let Some(position) = targets.iter().position(|t| t == target) else {
            return false;
        };
        targets.remove(position);
        if targets.is_empty() {
            self.objects.remove(property);
        }
        true
    }
    /// Swaps the first occurrence of `old` for `new`, keeping its position.
    pub(crate) fn replace_object(&mut self, property: &str, old: &str, new: &str) -> bool {
        let slot = self
            .objects
            .get_mut(property)
            .and_then(|targets| targets.iter_mut().find(|t| t.as_str() == old));
        match slot {
            Some(target) => {
                *target = new.to_owned();
                true
            }
            None => false,
        }
    }
    pub(crate) fn annotate(&mut self, property: &str, value: AnnotationValue) {
        self.annotations
            .entry(property.to_owned())
            .or_default()
            .push(value);
    }
    pub(crate) fn add_same_as(&mut self, other: &str) {
        if !self.same_as.iter().any(|s| s == other) {
            self.same_as.push(other.to_owned());
        }
    }
    pub(crate) fn add_different_from(&mut self, other: &str) {
        if !self.different_from.iter().any(|s| s == other) {
            self.different_from.push(other.to_owned());
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct IndividualKeeper {
    kept: HashMap<String, IndividualRecord, IriHasher>,
}

impl IndividualKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn keep(&mut self, iri: &str, record: IndividualRecord) {
        self.kept.insert(iri.to_owned(), record);
    }
    pub fn get(&self, iri: &str) -> Option<&IndividualRecord> {
        self.kept.get(iri)
    }
    pub(crate) fn get_mut(&mut self, iri: &str) -> Option<&mut IndividualRecord> {
        self.kept.get_mut(iri)
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

// ------------- Requests -------------

/// A scalar as it arrives from a caller; numbers and booleans are read through
/// their textual form before coercion.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarInput {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl ScalarInput {
    pub fn lexical(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
            Self::Flag(flag) => flag.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DataValueInput {
    #[serde(default)]
    pub value: Option<ScalarInput>,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

impl DataValueInput {
    pub fn typed(value: &str, datatype: &str) -> Self {
        Self {
            value: Some(ScalarInput::Text(value.to_owned())),
            datatype: Some(datatype.to_owned()),
            lang: None,
        }
    }
    pub fn plain(value: &str) -> Self {
        Self {
            value: Some(ScalarInput::Text(value.to_owned())),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DescriptionInput {
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct IndividualSpec {
    pub name: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default, alias = "data_properties")]
    pub properties: BTreeMap<String, Vec<DataValueInput>>,
    #[serde(default)]
    pub object_properties: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub annotations: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub description: DescriptionInput,
    #[serde(default)]
    pub same_as: Vec<String>,
    #[serde(default)]
    pub different_from: Vec<String>,
}

// ------------- Outcomes -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    DataProperty,
    ObjectProperty,
    Annotation,
    DescriptionType,
    SameAs,
    DifferentFrom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Unresolved,
    WrongKind,
    MissingValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssertionStatus {
    Applied,
    Skipped(SkipReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionOutcome {
    pub slot: Slot,
    pub identifier: String,
    pub status: AssertionStatus,
}

/// What happened to every optional assertion of an individual creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndividualReport {
    pub iri: String,
    pub outcomes: Vec<AssertionOutcome>,
}

impl IndividualReport {
    fn record(&mut self, slot: Slot, identifier: &str, status: AssertionStatus) {
        if let AssertionStatus::Skipped(reason) = status {
            debug!(individual = %self.iri, ?slot, identifier, ?reason, "assertion skipped");
        }
        self.outcomes.push(AssertionOutcome {
            slot,
            identifier: identifier.to_owned(),
            status,
        });
    }
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == AssertionStatus::Applied)
            .count()
    }
    pub fn skipped(&self) -> impl Iterator<Item = &AssertionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != AssertionStatus::Applied)
    }
}

impl Ontology {
    /// Resolves an identifier that must name an entity of `kind`.
    fn resolve_slot(&self, identifier: &str, kind: EntityKind) -> std::result::Result<String, SkipReason> {
        match self.entities.lookup(identifier) {
            Some(entity) if entity.kind() == kind => Ok(entity.iri().to_owned()),
            Some(_) => Err(SkipReason::WrongKind),
            None => Err(SkipReason::Unresolved),
        }
    }

    /// Registers an individual with its types; used when loading a document.
    pub(crate) fn declare_individual(&mut self, entity: Entity, types: Vec<ClassExpression>) -> Result<()> {
        let iri = entity.iri().to_owned();
        self.entities.register(entity)?;
        self.individuals.keep(&iri, IndividualRecord::new(types));
        Ok(())
    }

    pub fn create_individual(&mut self, spec: &IndividualSpec) -> Result<IndividualReport> {
        let name = require_name(&spec.name)?;
        if spec.classes.is_empty() {
            return Err(OntographError::InvalidRequest(
                "at least one class is required".to_owned(),
            ));
        }
        let mut types = Vec::with_capacity(spec.classes.len());
        for identifier in &spec.classes {
            let class = self
                .resolve_class(identifier)
                .ok_or_else(|| OntographError::ClassNotFound(identifier.clone()))?;
            let expression = ClassExpression::Named(class);
            if !types.contains(&expression) {
                types.push(expression);
            }
        }
        let iri = self.iri_for(name);
        if self.entities.contains(&iri) {
            return Err(OntographError::DuplicateIri(iri));
        }
        let mut record = IndividualRecord::new(types);
        let mut report = IndividualReport {
            iri: iri.clone(),
            outcomes: Vec::new(),
        };

        for (identifier, values) in &spec.properties {
            let property = match self.resolve_slot(identifier, EntityKind::DataProperty) {
                Ok(property) => property,
                Err(reason) => {
                    report.record(Slot::DataProperty, identifier, AssertionStatus::Skipped(reason));
                    continue;
                }
            };
            let functional = self.properties.is_functional(&property);
            for input in values {
                let Some(value) = &input.value else {
                    report.record(
                        Slot::DataProperty,
                        identifier,
                        AssertionStatus::Skipped(SkipReason::MissingValue),
                    );
                    continue;
                };
                let literal =
                    coerce(&value.lexical(), input.datatype.as_deref()).with_lang(input.lang.clone());
                record.assert_data(&property, literal, functional);
                report.record(Slot::DataProperty, identifier, AssertionStatus::Applied);
            }
        }

        for (identifier, targets) in &spec.object_properties {
            let property = match self.resolve_slot(identifier, EntityKind::ObjectProperty) {
                Ok(property) => property,
                Err(reason) => {
                    report.record(Slot::ObjectProperty, identifier, AssertionStatus::Skipped(reason));
                    continue;
                }
            };
            let functional = self.properties.is_functional(&property);
            for target in targets {
                match self.resolve_slot(target, EntityKind::Individual) {
                    Ok(target_iri) => {
                        record.assert_object(&property, &target_iri, functional);
                        report.record(Slot::ObjectProperty, target, AssertionStatus::Applied);
                    }
                    Err(reason) => {
                        report.record(Slot::ObjectProperty, target, AssertionStatus::Skipped(reason))
                    }
                }
            }
        }

        for (identifier, values) in &spec.annotations {
            match self.resolve_slot(identifier, EntityKind::AnnotationProperty) {
                Ok(property) => {
                    for value in values {
                        record.annotate(&property, AnnotationValue::Literal(Literal::string(value.as_str())));
                    }
                    report.record(Slot::Annotation, identifier, AssertionStatus::Applied);
                }
                Err(reason) => {
                    report.record(Slot::Annotation, identifier, AssertionStatus::Skipped(reason))
                }
            }
        }

        for identifier in &spec.description.types {
            match self.resolve_class(identifier) {
                Some(class) => {
                    record.add_type(ClassExpression::Named(class));
                    report.record(Slot::DescriptionType, identifier, AssertionStatus::Applied);
                }
                None => report.record(
                    Slot::DescriptionType,
                    identifier,
                    AssertionStatus::Skipped(SkipReason::Unresolved),
                ),
            }
        }

        for (slot, identifiers) in [
            (Slot::SameAs, &spec.same_as),
            (Slot::DifferentFrom, &spec.different_from),
        ] {
            for identifier in identifiers {
                match self.resolve_slot(identifier, EntityKind::Individual) {
                    Ok(other) if slot == Slot::SameAs => {
                        record.add_same_as(&other);
                        report.record(slot, identifier, AssertionStatus::Applied);
                    }
                    Ok(other) => {
                        record.add_different_from(&other);
                        report.record(slot, identifier, AssertionStatus::Applied);
                    }
                    Err(reason) => report.record(slot, identifier, AssertionStatus::Skipped(reason)),
                }
            }
        }

        self.entities.register(Entity::new(iri.as_str(), EntityKind::Individual))?;
        self.individuals.keep(&iri, record);
        info!(
            individual = %iri,
            applied = report.applied(),
            skipped = report.skipped().count(),
            "individual created"
        );
        Ok(report)
    }
}
