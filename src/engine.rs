//! The mutation engine: the only place where the live graph changes.
//!
//! Each [`Command`] runs against a staged copy of the graph. The copy is
//! committed through the [`Persistor`] and only then swapped in, so a command
//! either takes effect in memory and durably or not at all.

use std::fmt;

use serde::Deserialize;
use tracing::{info, warn};

use crate::construct::Ontology;
use crate::error::{OntographError, Result};
use crate::individual::{IndividualReport, IndividualSpec};
use crate::persist::{Export, Persistor};
use crate::relationship::{RelationshipChange, RelationshipRequest};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ClassSpec {
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectPropertySpec {
    #[serde(alias = "name")]
    pub property_name: String,
    #[serde(default)]
    pub domain: Vec<String>,
    #[serde(default)]
    pub range: Vec<String>,
    #[serde(default)]
    pub characteristics: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DataPropertySpec {
    #[serde(alias = "name")]
    pub property_name: String,
    #[serde(default)]
    pub domain: Vec<String>,
    /// Datatype name such as `int` or `xsd:string`.
    #[serde(default, alias = "datatype")]
    pub range: String,
    #[serde(default)]
    pub characteristics: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AnnotationPropertySpec {
    pub name: String,
    #[serde(default)]
    pub domain: Vec<String>,
}

/// Every structural change the engine knows how to apply.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CreateClass(ClassSpec),
    CreateObjectProperty(ObjectPropertySpec),
    CreateDataProperty(DataPropertySpec),
    CreateAnnotationProperty(AnnotationPropertySpec),
    CreateIndividual(IndividualSpec),
    ManageRelationship(RelationshipRequest),
}

impl Command {
    pub fn apply(&self, ontology: &mut Ontology) -> Result<Applied> {
        let applied = match self {
            Self::CreateClass(spec) => {
                Applied::Class(ontology.create_class(&spec.name, &spec.parents)?)
            }
            Self::CreateObjectProperty(spec) => Applied::ObjectProperty(ontology.create_object_property(
                &spec.property_name,
                &spec.domain,
                &spec.range,
                &spec.characteristics,
            )?),
            Self::CreateDataProperty(spec) => {
                if spec.range.trim().is_empty() {
                    return Err(OntographError::InvalidRequest(
                        "a datatype (range) is required".to_owned(),
                    ));
                }
                Applied::DataProperty(ontology.create_data_property(
                    &spec.property_name,
                    &spec.domain,
                    &spec.range,
                    &spec.characteristics,
                )?)
            }
            Self::CreateAnnotationProperty(spec) => Applied::AnnotationProperty(
                ontology.create_annotation_property(&spec.name, &spec.domain)?,
            ),
            Self::CreateIndividual(spec) => Applied::Individual(ontology.create_individual(spec)?),
            Self::ManageRelationship(request) => {
                Applied::Relationship(ontology.manage_relationship(request)?)
            }
        };
        Ok(applied)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CreateClass(spec) => write!(f, "create class '{}'", spec.name),
            Self::CreateObjectProperty(spec) => {
                write!(f, "create object property '{}'", spec.property_name)
            }
            Self::CreateDataProperty(spec) => {
                write!(f, "create data property '{}'", spec.property_name)
            }
            Self::CreateAnnotationProperty(spec) => {
                write!(f, "create annotation property '{}'", spec.name)
            }
            Self::CreateIndividual(spec) => write!(f, "create individual '{}'", spec.name),
            Self::ManageRelationship(request) => write!(
                f,
                "{} relationship '{}' {} '{}'",
                request.action, request.subject, request.object_property, request.target
            ),
        }
    }
}

/// What a successfully applied command produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    Class(String),
    ObjectProperty(String),
    DataProperty(String),
    AnnotationProperty(String),
    Individual(IndividualReport),
    Relationship(RelationshipChange),
}

impl Applied {
    /// IRI of the entity the command created or changed.
    pub fn iri(&self) -> &str {
        match self {
            Self::Class(iri)
            | Self::ObjectProperty(iri)
            | Self::DataProperty(iri)
            | Self::AnnotationProperty(iri) => iri,
            Self::Individual(report) => &report.iri,
            Self::Relationship(change) => &change.subject,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Unloaded,
    Loaded,
    Mutated,
    Exported,
}

#[derive(Debug)]
pub struct Engine {
    ontology: Option<Ontology>,
    persistor: Persistor,
    lifecycle: Lifecycle,
}

impl Engine {
    pub fn new(persistor: Persistor) -> Self {
        Self {
            ontology: None,
            persistor,
            lifecycle: Lifecycle::Unloaded,
        }
    }
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
    pub fn persistor(&self) -> &Persistor {
        &self.persistor
    }
    pub fn ontology(&self) -> Result<&Ontology> {
        self.ontology.as_ref().ok_or(OntographError::NoGraphLoaded)
    }
    /// Replaces the current graph with a decoded document. A document that
    /// fails to decode leaves the current graph in place.
    pub fn load(&mut self, bytes: &[u8]) -> Result<&Ontology> {
        let ontology = self.persistor.decode(bytes)?;
        self.persistor.store(bytes)?;
        info!(
            ontology = ontology.iri(),
            entities = ontology.entities().len(),
            "ontology loaded"
        );
        self.lifecycle = Lifecycle::Loaded;
        Ok(self.ontology.insert(ontology))
    }
    pub fn execute(&mut self, command: &Command) -> Result<Applied> {
        let mut staged = self.ontology()?.clone();
        let applied = command.apply(&mut staged)?;
        if let Err(e) = self.persistor.commit(&staged) {
            warn!(%command, error = %e, "commit failed, graph left unchanged");
            return Err(e);
        }
        self.ontology = Some(staged);
        self.lifecycle = Lifecycle::Mutated;
        info!(%command, "command applied");
        Ok(applied)
    }
    pub fn export(&mut self, filename: &str) -> Result<Export> {
        let export = self.persistor.export(self.ontology()?, filename)?;
        self.lifecycle = Lifecycle::Exported;
        Ok(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::PersistenceMode;

    fn loaded() -> Engine {
        let mut engine = Engine::new(Persistor::new(PersistenceMode::InMemory));
        let empty = engine
            .persistor()
            .encode(&Ontology::new("http://ex.org/zoo"))
            .expect("encode");
        engine.load(&empty).expect("load");
        engine
    }

    fn class(name: &str, parents: &[&str]) -> Command {
        Command::CreateClass(ClassSpec {
            name: name.to_owned(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
        })
    }

    #[test]
    fn commands_need_a_loaded_graph() {
        let mut engine = Engine::new(Persistor::new(PersistenceMode::InMemory));
        let err = engine.execute(&class("Animal", &[])).unwrap_err();
        assert!(matches!(err, OntographError::NoGraphLoaded));
        assert_eq!(engine.lifecycle(), Lifecycle::Unloaded);
    }

    #[test]
    fn lifecycle_moves_forward() {
        let mut engine = loaded();
        assert_eq!(engine.lifecycle(), Lifecycle::Loaded);
        engine.execute(&class("Animal", &[])).expect("animal");
        assert_eq!(engine.lifecycle(), Lifecycle::Mutated);
        engine.export("zoo").expect("export");
        assert_eq!(engine.lifecycle(), Lifecycle::Exported);
    }

    #[test]
    fn failed_commands_leave_the_graph_untouched() {
        let mut engine = loaded();
        engine.execute(&class("Animal", &[])).expect("animal");
        let head = engine.persistor().current_digest();
        let err = engine.execute(&class("Dog", &["Wolf"])).unwrap_err();
        assert!(matches!(err, OntographError::ParentNotFound(_)));
        let onto = engine.ontology().expect("graph");
        assert!(onto.entities().lookup("Dog").is_none());
        assert_eq!(engine.persistor().current_digest(), head);
    }

    #[test]
    fn data_properties_require_a_datatype() {
        let mut engine = loaded();
        let err = engine
            .execute(&Command::CreateDataProperty(DataPropertySpec {
                property_name: "age".into(),
                ..DataPropertySpec::default()
            }))
            .unwrap_err();
        assert!(matches!(err, OntographError::InvalidRequest(_)));
    }
}
