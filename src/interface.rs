//! The operation surface offered to transports.
//!
//! One lock guards the engine, so loads, mutations, exports and reads never
//! interleave. Every operation is synchronous and runs to completion; callers
//! on an async runtime should move them onto a blocking thread. Errors are
//! logged here once before they are handed back.

use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

use crate::construct::EntityKind;
use crate::engine::{
    AnnotationPropertySpec, ClassSpec, Command, DataPropertySpec, Engine, Lifecycle,
    ObjectPropertySpec,
};
use crate::error::{OntographError, Result};
use crate::individual::IndividualSpec;
use crate::persist::{Export, Persistor};
use crate::relationship::RelationshipRequest;
use crate::serialize::{
    ClassTreeView, EntitySummary, GraphSnapshot, IndividualSummary, PropertySummary,
};

pub struct OntologyInterface {
    engine: Mutex<Engine>,
}

impl OntologyInterface {
    pub fn new(persistor: Persistor) -> Self {
        Self {
            engine: Mutex::new(Engine::new(persistor)),
        }
    }

    fn engine(&self) -> Result<MutexGuard<'_, Engine>> {
        self.engine
            .lock()
            .map_err(|e| OntographError::Lock(e.to_string()))
    }

    fn run<T>(&self, operation: &str, f: impl FnOnce(&mut Engine) -> Result<T>) -> Result<T> {
        let result = self.engine().and_then(|mut engine| f(&mut engine));
        if let Err(e) = &result {
            warn!(operation, error = %e, "operation failed");
        }
        result
    }

    /// Replaces the current graph with the decoded document.
    pub fn load_graph(&self, bytes: &[u8]) -> Result<GraphSnapshot> {
        self.run("load", |engine| engine.load(bytes).map(|onto| onto.snapshot()))
    }

    pub fn create_class(&self, spec: ClassSpec) -> Result<ClassTreeView> {
        self.run("create class", |engine| {
            engine.execute(&Command::CreateClass(spec))?;
            Ok(engine.ontology()?.class_tree_view())
        })
    }

    pub fn create_object_property(&self, spec: ObjectPropertySpec) -> Result<Vec<PropertySummary>> {
        self.run("create object property", |engine| {
            engine.execute(&Command::CreateObjectProperty(spec))?;
            Ok(engine.ontology()?.property_summaries(EntityKind::ObjectProperty))
        })
    }

    /// Acknowledges with the IRI of the new property.
    pub fn create_data_property(&self, spec: DataPropertySpec) -> Result<String> {
        self.run("create data property", |engine| {
            let applied = engine.execute(&Command::CreateDataProperty(spec))?;
            Ok(applied.iri().to_owned())
        })
    }

    pub fn create_annotation_property(
        &self,
        spec: AnnotationPropertySpec,
    ) -> Result<Vec<PropertySummary>> {
        self.run("create annotation property", |engine| {
            engine.execute(&Command::CreateAnnotationProperty(spec))?;
            Ok(engine.ontology()?.property_summaries(EntityKind::AnnotationProperty))
        })
    }

    pub fn create_individual(&self, spec: IndividualSpec) -> Result<Vec<IndividualSummary>> {
        self.run("create individual", |engine| {
            engine.execute(&Command::CreateIndividual(spec))?;
            Ok(engine.ontology()?.individual_summaries())
        })
    }

    pub fn manage_relationship(&self, request: RelationshipRequest) -> Result<Vec<IndividualSummary>> {
        self.run("manage relationship", |engine| {
            engine.execute(&Command::ManageRelationship(request))?;
            Ok(engine.ontology()?.individual_summaries())
        })
    }

    pub fn export_graph(&self, filename: &str) -> Result<Export> {
        self.run("export", |engine| {
            let export = engine.export(filename)?;
            info!(filename = %export.filename, bytes = export.bytes.len(), "export ready");
            Ok(export)
        })
    }

    pub fn list_object_properties(&self) -> Result<Vec<PropertySummary>> {
        self.run("list object properties", |engine| {
            Ok(engine.ontology()?.property_summaries(EntityKind::ObjectProperty))
        })
    }

    pub fn list_data_properties(&self) -> Result<Vec<PropertySummary>> {
        self.run("list data properties", |engine| {
            Ok(engine.ontology()?.property_summaries(EntityKind::DataProperty))
        })
    }

    pub fn list_classes(&self) -> Result<Vec<EntitySummary>> {
        self.run("list classes", |engine| Ok(engine.ontology()?.class_summaries()))
    }

    pub fn snapshot(&self) -> Result<GraphSnapshot> {
        self.run("snapshot", |engine| Ok(engine.ontology()?.snapshot()))
    }

    pub fn lifecycle(&self) -> Result<Lifecycle> {
        self.run("lifecycle", |engine| Ok(engine.lifecycle()))
    }

    /// Digest of the last durable commit, if any.
    pub fn current_digest(&self) -> Result<Option<String>> {
        self.run("digest", |engine| Ok(engine.persistor().current_digest()))
    }
}
