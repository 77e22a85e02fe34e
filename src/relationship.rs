//! Add, remove and replace object-property edges between individuals.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::construct::{EntityKind, Ontology};
use crate::error::{OntographError, Result};
use crate::individual::IndividualRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipAction {
    Add,
    Remove,
    Replace,
}

impl FromStr for RelationshipAction {
    type Err = OntographError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            other => Err(OntographError::InvalidAction(other.to_owned())),
        }
    }
}

impl fmt::Display for RelationshipAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let action = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
        };
        f.write_str(action)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RelationshipRequest {
    pub subject: String,
    #[serde(alias = "property")]
    pub object_property: String,
    #[serde(default)]
    pub target: String,
    pub action: String,
    #[serde(default)]
    pub replace_with: Option<String>,
}

impl RelationshipRequest {
    pub fn new(subject: &str, property: &str, target: &str, action: &str) -> Self {
        Self {
            subject: subject.to_owned(),
            object_property: property.to_owned(),
            target: target.to_owned(),
            action: action.to_owned(),
            replace_with: None,
        }
    }
    pub fn replacing(mut self, replace_with: &str) -> Self {
        self.replace_with = Some(replace_with.to_owned());
        self
    }
}

/// The edge list of `(subject, property)` after a successful edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipChange {
    pub subject: String,
    pub property: String,
    pub action: RelationshipAction,
    pub targets: Vec<String>,
}

impl Ontology {
    fn resolve_target(&self, identifier: &str) -> Result<String> {
        self.resolve_kind(identifier, EntityKind::Individual)
            .map(|e| e.iri().to_owned())
            .ok_or_else(|| OntographError::TargetNotFound(identifier.to_owned()))
    }

    pub fn manage_relationship(&mut self, request: &RelationshipRequest) -> Result<RelationshipChange> {
        let subject = self
            .resolve_kind(&request.subject, EntityKind::Individual)
            .ok_or_else(|| OntographError::NotFound(request.subject.clone()))?;
        let property = self.resolve(&request.object_property)?;
        if !property.kind().is_object_property() {
            return Err(OntographError::NotAnObjectProperty(request.object_property.clone()));
        }
        let action: RelationshipAction = request.action.parse()?;
        let functional = self.properties.is_functional(property.iri());
        let relation_missing = || OntographError::RelationNotFound {
            subject: request.subject.clone(),
            property: request.object_property.clone(),
            target: request.target.clone(),
        };

        match action {
            RelationshipAction::Add => {
                let target = self.resolve_target(&request.target)?;
                let record = self.subject_record(subject.iri())?;
                record.assert_object(property.iri(), &target, functional);
            }
            RelationshipAction::Remove => {
                let target = self.resolve_target(&request.target)?;
                let record = self.subject_record(subject.iri())?;
                if !record.retract_object(property.iri(), &target) {
                    return Err(relation_missing());
                }
            }
            RelationshipAction::Replace => {
                let replacement = request
                    .replace_with
                    .as_deref()
                    .filter(|r| !r.is_empty())
                    .ok_or(OntographError::MissingReplacement)?;
                let old = self.resolve_target(&request.target)?;
                let new = self.resolve_target(replacement)?;
                let record = self.subject_record(subject.iri())?;
                if !record.replace_object(property.iri(), &old, &new) {
                    return Err(relation_missing());
                }
            }
        }

        let targets = self
            .individuals
            .get(subject.iri())
            .map(|r| r.targets(property.iri()).to_vec())
            .unwrap_or_default();
        debug!(subject = subject.iri(), property = property.iri(), %action, targets = targets.len(), "relationship updated");
        Ok(RelationshipChange {
            subject: subject.iri().to_owned(),
            property: property.iri().to_owned(),
            action,
            targets,
        })
    }

    fn subject_record(&mut self, iri: &str) -> Result<&mut IndividualRecord> {
        self.individuals
            .get_mut(iri)
            .ok_or_else(|| OntographError::NotFound(iri.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::IndividualSpec;

    fn household() -> Ontology {
        let mut onto = Ontology::new("http://ex.org/home");
        onto.create_class("Dog", &[]).expect("dog");
        onto.create_class("Person", &[]).expect("person");
        onto.create_object_property("hasOwner", &["Dog".into()], &["Person".into()], &["functional".into()])
            .expect("hasOwner");
        onto.create_object_property("likes", &[], &[], &[]).expect("likes");
        onto.create_data_property("age", &[], "int", &[]).expect("age");
        for (name, class) in [("Rex", "Dog"), ("Alice", "Person"), ("Bob", "Person"), ("Carol", "Person")] {
            onto.create_individual(&IndividualSpec {
                name: name.into(),
                classes: vec![class.into()],
                ..IndividualSpec::default()
            })
            .expect("individual");
        }
        onto
    }

    fn likes(onto: &Ontology) -> Vec<String> {
        onto.individuals()
            .get("http://ex.org/home#Rex")
            .map(|r| r.targets("http://ex.org/home#likes").to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn add_then_remove_restores_the_edges() {
        let mut onto = household();
        onto.manage_relationship(&RelationshipRequest::new("Rex", "likes", "Alice", "add"))
            .expect("add alice");
        let before = likes(&onto);
        onto.manage_relationship(&RelationshipRequest::new("Rex", "likes", "Bob", "add"))
            .expect("add bob");
        onto.manage_relationship(&RelationshipRequest::new("Rex", "likes", "Bob", "remove"))
            .expect("remove bob");
        assert_eq!(likes(&onto), before);
    }

    #[test]
    fn replace_keeps_the_position() {
        let mut onto = household();
        for target in ["Alice", "Bob"] {
            onto.manage_relationship(&RelationshipRequest::new("Rex", "likes", target, "add"))
                .expect("add");
        }
        let change = onto
            .manage_relationship(&RelationshipRequest::new("Rex", "likes", "Alice", "replace").replacing("Carol"))
            .expect("replace");
        assert_eq!(
            change.targets,
            vec!["http://ex.org/home#Carol".to_owned(), "http://ex.org/home#Bob".to_owned()]
        );
        onto.manage_relationship(&RelationshipRequest::new("Rex", "likes", "Carol", "replace").replacing("Alice"))
            .expect("replace back");
        assert_eq!(
            likes(&onto),
            vec!["http://ex.org/home#Alice".to_owned(), "http://ex.org/home#Bob".to_owned()]
        );
    }

    #[test]
    fn functional_add_overwrites() {
        let mut onto = household();
        onto.manage_relationship(&RelationshipRequest::new("Rex", "hasOwner", "Alice", "add"))
            .expect("alice");
        let change = onto
            .manage_relationship(&RelationshipRequest::new("Rex", "hasOwner", "Bob", "add"))
            .expect("bob");
        assert_eq!(change.targets, vec!["http://ex.org/home#Bob".to_owned()]);
    }

    #[test]
    fn failures_are_checked_in_order() {
        let mut onto = household();
        let err = onto
            .manage_relationship(&RelationshipRequest::new("Max", "likes", "Alice", "add"))
            .unwrap_err();
        assert!(matches!(err, OntographError::NotFound(s) if s == "Max"));
        let err = onto
            .manage_relationship(&RelationshipRequest::new("Rex", "age", "Alice", "add"))
            .unwrap_err();
        assert!(matches!(err, OntographError::NotAnObjectProperty(_)));
        let err = onto
            .manage_relationship(&RelationshipRequest::new("Rex", "likes", "Alice", "swap"))
            .unwrap_err();
        assert!(matches!(err, OntographError::InvalidAction(a) if a == "swap"));
        let err = onto
            .manage_relationship(&RelationshipRequest::new("Rex", "likes", "Zed", "add"))
            .unwrap_err();
        assert!(matches!(err, OntographError::TargetNotFound(_)));
        let err = onto
            .manage_relationship(&RelationshipRequest::new("Rex", "likes", "Alice", "remove"))
            .unwrap_err();
        assert!(matches!(err, OntographError::RelationNotFound { .. }));
        let err = onto
            .manage_relationship(&RelationshipRequest::new("Rex", "likes", "Alice", "replace"))
            .unwrap_err();
        assert!(matches!(err, OntographError::MissingReplacement));
        let err = onto
            .manage_relationship(&RelationshipRequest::new("Rex", "likes", "Alice", "replace").replacing("Bob"))
            .unwrap_err();
        assert!(matches!(err, OntographError::RelationNotFound { .. }));
    }

    #[test]
    fn requests_accept_both_property_keys() {
        let request: RelationshipRequest = serde_json::from_str(
            r#"{"subject": "Rex", "object_property": "likes", "target": "Alice", "action": "add"}"#,
        )
        .expect("object_property");
        assert_eq!(request.object_property, "likes");
        let request: RelationshipRequest =
            serde_json::from_str(r#"{"subject": "Rex", "property": "likes", "action": "replace", "replace_with": "Bob"}"#)
                .expect("property");
        assert_eq!(request.replace_with.as_deref(), Some("Bob"));
        assert_eq!(request.target, "");
    }
}
