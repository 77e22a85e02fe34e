//! Class hierarchy: parent/child edges between named classes, root discovery
//! and deterministic subtree rendering.
//!
//! Every class has at least one named parent. A class created without one is
//! parented by the `owl:Thing` sentinel, which is never kept as an entity. The
//! hierarchy is acyclic; any edge that would make a class its own ancestor is
//! rejected before it is stored.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::construct::{
    local_name, require_name, ClassExpression, Entity, EntityKind, IriHasher, Ontology, THING_IRI,
};
use crate::error::{OntographError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassRecord {
    parents: Vec<String>,
    anonymous: Vec<ClassExpression>,
}

impl ClassRecord {
    /// Named parents in assertion order, `owl:Thing` when there are none.
    pub fn parents(&self) -> &[String] {
        &self.parents
    }
    /// Superclass expressions that are not plain named classes.
    pub fn anonymous_parents(&self) -> &[ClassExpression] {
        &self.anonymous
    }
    pub fn is_root(&self) -> bool {
        self.parents.len() == 1 && self.parents[0] == THING_IRI
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClassKeeper {
    kept: HashMap<String, ClassRecord, IriHasher>,
    children: HashMap<String, BTreeSet<String>, IriHasher>,
}

impl ClassKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    /// Keeps a class with the given named parents, defaulting to `owl:Thing`.
    pub fn keep(&mut self, iri: &str, parents: Vec<String>) -> Result<()> {
        for parent in &parents {
            self.check_edge(iri, parent)?;
        }
        let mut record = ClassRecord {
            parents: Vec::new(),
            anonymous: Vec::new(),
        };
        for parent in parents {
            if !record.parents.contains(&parent) {
                record.parents.push(parent);
            }
        }
        if record.parents.is_empty() {
            record.parents.push(THING_IRI.to_owned());
        }
        for parent in &record.parents {
            self.children
                .entry(parent.clone())
                .or_default()
                .insert(iri.to_owned());
        }
        self.kept.insert(iri.to_owned(), record);
        Ok(())
    }
    /// Adds a named parent to an existing class, replacing the `owl:Thing` default.
    pub fn add_parent(&mut self, iri: &str, parent: &str) -> Result<()> {
        if parent == THING_IRI {
            return Ok(());
        }
        self.check_edge(iri, parent)?;
        let Some(record) = self.kept.get_mut(iri) else {
            return Err(OntographError::ClassNotFound(iri.to_owned()));
        };
        if record.parents.iter().any(|p| p == parent) {
            return Ok(());
        }
        if record.is_root() {
            record.parents.clear();
            if let Some(siblings) = self.children.get_mut(THING_IRI) {
                siblings.remove(iri);
            }
        }
        record.parents.push(parent.to_owned());
        self.children
            .entry(parent.to_owned())
            .or_default()
            .insert(iri.to_owned());
        Ok(())
    }
    pub fn add_anonymous_parent(&mut self, iri: &str, expression: ClassExpression) -> Result<()> {
        let record = self
            .kept
            .get_mut(iri)
            .ok_or_else(|| OntographError::ClassNotFound(iri.to_owned()))?;
        if !record.anonymous.contains(&expression) {
            record.anonymous.push(expression);
        }
        Ok(())
    }
    fn check_edge(&self, iri: &str, parent: &str) -> Result<()> {
        if parent == iri || self.is_ancestor(iri, parent) {
            return Err(OntographError::CyclicHierarchy {
                class: iri.to_owned(),
                parent: parent.to_owned(),
            });
        }
        Ok(())
    }
    /// True if `ancestor` is reachable from `iri` by following parent edges.
    pub fn is_ancestor(&self, ancestor: &str, iri: &str) -> bool {
        let mut stack = vec![iri];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(record) = self.kept.get(current) {
                for parent in &record.parents {
                    if parent == ancestor {
                        return true;
                    }
                    stack.push(parent);
                }
            }
        }
        false
    }
    pub fn get(&self, iri: &str) -> Option<&ClassRecord> {
        self.kept.get(iri)
    }
    pub fn contains(&self, iri: &str) -> bool {
        self.kept.contains_key(iri)
    }
    /// Direct subclasses, ordered by IRI.
    pub fn children(&self, iri: &str) -> impl Iterator<Item = &String> {
        self.children.get(iri).into_iter().flatten()
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

/// One node of a rendered class tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassNode {
    pub name: String,
    pub children: Vec<ClassNode>,
}

impl Ontology {
    /// Declares a class with no parents yet; used when loading a document.
    pub(crate) fn declare_class(&mut self, entity: Entity) -> Result<()> {
        let iri = entity.iri().to_owned();
        self.entities.register(entity)?;
        self.classes.keep(&iri, Vec::new())
    }
    /// Makes sure a named class exists, registering a bare one if the IRI is unknown.
    /// Returns false when the IRI is taken by an entity of another kind.
    pub(crate) fn ensure_class(&mut self, iri: &str) -> Result<bool> {
        if iri == THING_IRI {
            return Ok(true);
        }
        match self.entities.get(iri).map(|e| e.kind()) {
            Some(EntityKind::Class) => Ok(true),
            Some(_) => Ok(false),
            None => {
                debug!(class = iri, "registering referenced class");
                self.declare_class(Entity::new(iri, EntityKind::Class))?;
                Ok(true)
            }
        }
    }
    /// Resolves an identifier to a class IRI. `Thing` and the `owl:Thing` IRI
    /// name the sentinel when no kept entity matches.
    pub fn resolve_class(&self, identifier: &str) -> Option<String> {
        match self.entities.lookup(identifier) {
            Some(entity) if entity.kind().is_class() => Some(entity.iri().to_owned()),
            Some(_) => None,
            None if identifier == "Thing" || identifier == THING_IRI => Some(THING_IRI.to_owned()),
            None => None,
        }
    }
    pub fn create_class(&mut self, name: &str, parent_identifiers: &[String]) -> Result<String> {
        let name = require_name(name)?;
        let mut parents = Vec::with_capacity(parent_identifiers.len());
        for identifier in parent_identifiers {
            let parent = self
                .resolve_class(identifier)
                .ok_or_else(|| OntographError::ParentNotFound(identifier.clone()))?;
            if parent != THING_IRI {
                parents.push(parent);
            }
        }
        let iri = self.iri_for(name);
        if self.entities.contains(&iri) {
            return Err(OntographError::DuplicateIri(iri));
        }
        self.classes.keep(&iri, parents)?;
        self.entities.register(Entity::new(iri.as_str(), EntityKind::Class))?;
        Ok(iri)
    }
    /// Classes whose only parent is `owl:Thing`, or every class if there are none.
    pub fn roots(&self) -> Vec<String> {
        let classes: Vec<&str> = self
            .entities
            .of_kind(EntityKind::Class)
            .map(|e| e.iri())
            .collect();
        let roots: Vec<&str> = classes
            .iter()
            .copied()
            .filter(|iri| self.classes.get(iri).is_some_and(ClassRecord::is_root))
            .collect();
        let mut roots = if roots.is_empty() { classes } else { roots };
        roots.sort_by(|a, b| local_name(a).cmp(local_name(b)).then(a.cmp(b)));
        roots.into_iter().map(str::to_owned).collect()
    }
    /// Renders the tree below a class, children sorted by name at every level.
    pub fn subtree(&self, iri: &str) -> ClassNode {
        let mut path = HashSet::new();
        self.subtree_within(iri, &mut path)
    }
    fn subtree_within<'a>(&'a self, iri: &'a str, path: &mut HashSet<&'a str>) -> ClassNode {
        let mut node = ClassNode {
            name: local_name(iri).to_owned(),
            children: Vec::new(),
        };
        if !path.insert(iri) {
            return node;
        }
        let mut children: Vec<&String> = self.classes.children(iri).collect();
        children.sort_by(|a, b| local_name(a).cmp(local_name(b)).then(a.cmp(b)));
        node.children = children
            .into_iter()
            .map(|child| self.subtree_within(child, path))
            .collect();
        path.remove(iri);
        node
    }
    pub fn class_tree(&self) -> Vec<ClassNode> {
        self.roots().iter().map(|root| self.subtree(root)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoo() -> Ontology {
        let mut onto = Ontology::new("http://ex.org/zoo");
        onto.create_class("Animal", &[]).expect("animal");
        onto.create_class("Dog", &["Animal".into()]).expect("dog");
        onto.create_class("Cat", &["Animal".into()]).expect("cat");
        onto.create_class("Beagle", &["Dog".into()]).expect("beagle");
        onto
    }

    #[test]
    fn classes_without_parents_hang_off_thing() {
        let onto = zoo();
        let animal = onto.classes().get("http://ex.org/zoo#Animal").expect("kept");
        assert_eq!(animal.parents(), [THING_IRI.to_owned()]);
        assert_eq!(onto.roots(), vec!["http://ex.org/zoo#Animal".to_owned()]);
    }

    #[test]
    fn explicit_thing_parent_is_the_sentinel() {
        let mut onto = zoo();
        onto.create_class("Plant", &["Thing".into()]).expect("plant");
        assert_eq!(onto.roots().len(), 2);
    }

    #[test]
    fn unknown_parent_fails_without_side_effects() {
        let mut onto = zoo();
        let err = onto.create_class("Fish", &["Water".into()]).unwrap_err();
        assert!(matches!(err, OntographError::ParentNotFound(p) if p == "Water"));
        assert!(!onto.entities().contains("http://ex.org/zoo#Fish"));
    }

    #[test]
    fn subtree_children_are_sorted_by_name() {
        let onto = zoo();
        let tree = onto.subtree("http://ex.org/zoo#Animal");
        let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Cat", "Dog"]);
        assert_eq!(tree.children[1].children[0].name, "Beagle");
    }

    #[test]
    fn cycles_are_rejected() {
        let mut onto = zoo();
        let err = onto
            .classes
            .add_parent("http://ex.org/zoo#Animal", "http://ex.org/zoo#Beagle")
            .unwrap_err();
        assert!(matches!(err, OntographError::CyclicHierarchy { .. }));
        let err = onto
            .classes
            .add_parent("http://ex.org/zoo#Dog", "http://ex.org/zoo#Dog")
            .unwrap_err();
        assert!(matches!(err, OntographError::CyclicHierarchy { .. }));
    }

    #[test]
    fn linking_a_declared_class_removes_it_from_the_roots() {
        let mut onto = Ontology::new("http://ex.org/loop");
        onto.declare_class(Entity::new("http://ex.org/loop#A", EntityKind::Class))
            .expect("a");
        onto.declare_class(Entity::new("http://ex.org/loop#B", EntityKind::Class))
            .expect("b");
        onto.declare_class(Entity::new("http://ex.org/loop#C", EntityKind::Class))
            .expect("c");
        onto.classes
            .add_parent("http://ex.org/loop#A", "http://ex.org/loop#C")
            .expect("a < c");
        onto.classes
            .add_parent("http://ex.org/loop#B", "http://ex.org/loop#A")
            .expect("b < a");
        assert_eq!(onto.roots(), vec!["http://ex.org/loop#C".to_owned()]);
        let err = onto
            .classes
            .add_parent("http://ex.org/loop#C", "http://ex.org/loop#B")
            .unwrap_err();
        assert!(matches!(err, OntographError::CyclicHierarchy { .. }));
    }

    #[test]
    fn without_a_root_every_class_is_listed() {
        let mut onto = Ontology::new("http://ex.org/open");
        onto.declare_class(Entity::new("http://ex.org/open#B", EntityKind::Class))
            .expect("b");
        onto.declare_class(Entity::new("http://ex.org/open#A", EntityKind::Class))
            .expect("a");
        // a parent that is never kept as a class
        onto.classes
            .add_parent("http://ex.org/open#A", "http://ex.org/elsewhere#Outside")
            .expect("a < outside");
        onto.classes
            .add_parent("http://ex.org/open#B", "http://ex.org/open#A")
            .expect("b < a");
        assert_eq!(
            onto.roots(),
            vec!["http://ex.org/open#A".to_owned(), "http://ex.org/open#B".to_owned()]
        );
    }

    #[test]
    fn duplicate_class_names_are_rejected() {
        let mut onto = zoo();
        let err = onto.create_class("Dog", &[]).unwrap_err();
        assert!(matches!(err, OntographError::DuplicateIri(_)));
    }
}
