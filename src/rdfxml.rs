//! OWL documents in RDF/XML.
//!
//! Decoding parses the document into triples with `sophia`, indexes them by
//! subject and rebuilds the graph in three passes: classify named subjects,
//! register them in document order, then link hierarchy, property and
//! assertion edges. Encoding walks the entity table in registration order and
//! writes one node element per entity with `quick-xml`.

use std::collections::{HashMap, HashSet};
use std::io::BufReader;

use bimap::BiMap;
use lazy_static::lazy_static;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use sophia::api::prelude::*;
use tracing::debug;

use crate::construct::{
    ClassExpression, Entity, EntityKind, IriHasher, Ontology, DEFAULT_ONTOLOGY_IRI, OWL, THING_IRI,
};
use crate::datatype::{Literal, Value, XSD};
use crate::error::{OntographError, Result};
use crate::individual::AnnotationValue;
use crate::persist::Codec;
use crate::registry::{Characteristic, Datatype, PropertyKind, PropertyRecord, Range};

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";

lazy_static! {
    // splits an IRI into a namespace and the longest trailing XML name
    static ref LOCAL_PART: Regex =
        Regex::new(r"^(.*?)([\p{L}_][\p{L}\p{N}_.\-]*)$").unwrap();
}

fn rdf(local: &str) -> String {
    format!("{RDF}{local}")
}
fn rdfs(local: &str) -> String {
    format!("{RDFS}{local}")
}
fn owl(local: &str) -> String {
    format!("{OWL}{local}")
}

/// The default durable codec.
#[derive(Clone, Debug)]
pub struct RdfXmlCodec {
    fallback_iri: String,
}

impl RdfXmlCodec {
    /// `fallback_iri` names the graph when a document declares no `owl:Ontology`.
    pub fn new(fallback_iri: &str) -> Self {
        Self {
            fallback_iri: fallback_iri.to_owned(),
        }
    }
}

impl Default for RdfXmlCodec {
    fn default() -> Self {
        Self::new(DEFAULT_ONTOLOGY_IRI)
    }
}

impl Codec for RdfXmlCodec {
    fn encode(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        Encoder::new(ontology).write()
    }
    fn decode(&self, bytes: &[u8]) -> Result<Ontology> {
        let document = Document::parse(bytes)?;
        Decoder::new(&document, &self.fallback_iri).decode()
    }
}

// ------------- Triples -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Node {
    Iri(String),
    Blank(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Object {
    Node(Node),
    Literal {
        lexical: String,
        datatype: Option<String>,
        lang: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TripleSinkError(String);

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Reads a term back from its N-Triples style display form.
fn parse_term(display: &str) -> std::result::Result<Object, TripleSinkError> {
    let s = display.trim();
    if let Some(iri) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Object::Node(Node::Iri(iri.to_owned())));
    }
    if let Some(id) = s.strip_prefix("_:") {
        return Ok(Object::Node(Node::Blank(id.to_owned())));
    }
    if !s.starts_with('"') {
        return Err(TripleSinkError(format!("unsupported term: {s}")));
    }
    let mut end = None;
    let mut escaped = false;
    for (i, ch) in s.char_indices().skip(1) {
        if ch == '"' && !escaped {
            end = Some(i);
            break;
        }
        escaped = ch == '\\' && !escaped;
    }
    let end = end.ok_or_else(|| TripleSinkError(format!("unterminated literal: {s}")))?;
    let lexical = unescape(&s[1..end]);
    let rest = s[end + 1..].trim();
    let (datatype, lang) = if let Some(lang) = rest.strip_prefix('@') {
        (None, Some(lang.to_owned()))
    } else if let Some(dt) = rest.strip_prefix("^^") {
        let dt = dt.trim();
        let dt = dt
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .unwrap_or(dt);
        (Some(dt.to_owned()), None)
    } else {
        (None, None)
    };
    Ok(Object::Literal {
        lexical,
        datatype,
        lang,
    })
}

fn parse_node(display: &str) -> std::result::Result<Node, TripleSinkError> {
    match parse_term(display)? {
        Object::Node(node) => Ok(node),
        Object::Literal { .. } => Err(TripleSinkError(format!("expected a node: {display}"))),
    }
}

/// Every triple of a document, grouped by subject in document order.
#[derive(Debug, Default)]
struct Document {
    subjects: Vec<Node>,
    statements: HashMap<Node, Vec<(String, Object)>, IriHasher>,
}

impl Document {
    fn parse(bytes: &[u8]) -> Result<Self> {
        let mut document = Document::default();
        let mut parser = sophia::xml::parser::parse_bufread(BufReader::new(bytes));
        parser
            .try_for_each_triple(|t| -> std::result::Result<(), TripleSinkError> {
                let subject = parse_node(&t.s().to_string())?;
                let Node::Iri(predicate) = parse_node(&t.p().to_string())? else {
                    return Ok(());
                };
                let object = parse_term(&t.o().to_string())?;
                document.push(subject, predicate, object);
                Ok(())
            })
            .map_err(|e| OntographError::Codec(format!("failed to parse RDF/XML: {e}")))?;
        Ok(document)
    }
    fn push(&mut self, subject: Node, predicate: String, object: Object) {
        if !self.statements.contains_key(&subject) {
            self.subjects.push(subject.clone());
        }
        self.statements
            .entry(subject)
            .or_default()
            .push((predicate, object));
    }
    fn statements(&self, subject: &Node) -> &[(String, Object)] {
        self.statements
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
    fn objects<'a, 'p>(
        &'a self,
        subject: &Node,
        predicate: &'p str,
    ) -> impl Iterator<Item = &'a Object> + use<'a, 'p> {
        self.statements(subject)
            .iter()
            .filter(move |(p, _)| p == predicate)
            .map(|(_, o)| o)
    }
    fn iri_objects<'a, 'p>(
        &'a self,
        subject: &Node,
        predicate: &'p str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'p> {
        self.objects(subject, predicate).filter_map(|o| match o {
            Object::Node(Node::Iri(iri)) => Some(iri.as_str()),
            _ => None,
        })
    }
    fn first_literal(&self, subject: &Node, predicate: &str) -> Option<String> {
        self.objects(subject, predicate).find_map(|o| match o {
            Object::Literal { lexical, .. } => Some(lexical.clone()),
            _ => None,
        })
    }
    /// Members of an RDF list, following `rdf:first`/`rdf:rest` until `rdf:nil`.
    fn list(&self, head: &Node) -> Vec<&Object> {
        let first = rdf("first");
        let rest = rdf("rest");
        let nil = Node::Iri(rdf("nil"));
        let mut members = Vec::new();
        let mut seen = HashSet::new();
        let mut current = head.clone();
        while current != nil && seen.insert(current.clone()) {
            if let Some(member) = self.objects(&current, &first).next() {
                members.push(member);
            }
            match self.objects(&current, &rest).next() {
                Some(Object::Node(next)) => current = next.clone(),
                _ => break,
            }
        }
        members
    }
}

// ------------- Decoding -------------
struct Decoder<'d> {
    document: &'d Document,
    ontology: Ontology,
    kinds: HashMap<String, EntityKind, IriHasher>,
}

impl<'d> Decoder<'d> {
    fn new(document: &'d Document, fallback_iri: &str) -> Self {
        let rdf_type = rdf("type");
        let ontology_type = owl("Ontology");
        let iri = document
            .subjects
            .iter()
            .find_map(|s| match s {
                Node::Iri(iri) if document.iri_objects(s, &rdf_type).any(|t| t == ontology_type) => {
                    Some(iri.as_str())
                }
                _ => None,
            })
            .unwrap_or(fallback_iri);
        Self {
            document,
            ontology: Ontology::new(iri),
            kinds: HashMap::default(),
        }
    }

    fn decode(mut self) -> Result<Ontology> {
        self.classify();
        self.register()?;
        for subject in &self.document.subjects {
            let Node::Iri(iri) = subject else { continue };
            match self.kinds.get(iri).copied() {
                Some(EntityKind::Class) => self.link_class(iri, subject)?,
                Some(kind) if kind.is_property() => self.link_property(iri, subject)?,
                Some(EntityKind::Individual) => self.link_individual(iri, subject)?,
                _ => {}
            }
        }
        debug!(
            ontology = self.ontology.iri(),
            entities = self.ontology.entities().len(),
            "document decoded"
        );
        Ok(self.ontology)
    }

    fn classify(&mut self) {
        let rdf_type = rdf("type");
        let class_types = [owl("Class"), rdfs("Class")];
        let sub_class_of = rdfs("subClassOf");
        for subject in &self.document.subjects {
            let Node::Iri(iri) = subject else { continue };
            let is_class = self
                .document
                .iri_objects(subject, &rdf_type)
                .any(|t| class_types.iter().any(|c| c == t))
                || self.document.objects(subject, &sub_class_of).next().is_some();
            if is_class && iri != THING_IRI {
                self.kinds.insert(iri.clone(), EntityKind::Class);
            }
        }
        let (object, data, annotation, named) = (
            owl("ObjectProperty"),
            owl("DatatypeProperty"),
            owl("AnnotationProperty"),
            owl("NamedIndividual"),
        );
        for subject in &self.document.subjects {
            let Node::Iri(iri) = subject else { continue };
            if self.kinds.contains_key(iri) {
                continue;
            }
            let types: Vec<&str> = self.document.iri_objects(subject, &rdf_type).collect();
            let kind = if types.contains(&object.as_str()) {
                Some(EntityKind::ObjectProperty)
            } else if types.contains(&data.as_str()) {
                Some(EntityKind::DataProperty)
            } else if types.contains(&annotation.as_str()) {
                Some(EntityKind::AnnotationProperty)
            } else if types.iter().any(|t| Characteristic::from_iri(t).is_some()) {
                Some(EntityKind::ObjectProperty)
            } else if types.contains(&named.as_str())
                || types
                    .iter()
                    .any(|t| self.kinds.get(*t) == Some(&EntityKind::Class))
            {
                Some(EntityKind::Individual)
            } else {
                None
            };
            match kind {
                Some(kind) => {
                    self.kinds.insert(iri.clone(), kind);
                }
                None => debug!(subject = %iri, "subject ignored"),
            }
        }
    }

    fn register(&mut self) -> Result<()> {
        let (label, comment) = (rdfs("label"), rdfs("comment"));
        for subject in &self.document.subjects {
            let Node::Iri(iri) = subject else { continue };
            let Some(kind) = self.kinds.get(iri).copied() else {
                continue;
            };
            let entity = Entity::new(iri.as_str(), kind)
                .with_label(self.document.first_literal(subject, &label))
                .with_comment(self.document.first_literal(subject, &comment));
            match kind {
                EntityKind::Class => self.ontology.declare_class(entity)?,
                EntityKind::Individual => self.ontology.declare_individual(entity, Vec::new())?,
                _ => {
                    if let Some(property) = PropertyKind::from_entity_kind(kind) {
                        self.ontology.properties.keep(iri, PropertyRecord::new(property));
                    }
                    self.ontology.entities.register(entity)?;
                }
            }
        }
        Ok(())
    }

    /// Reads a class expression from a node, registering named classes it mentions.
    fn expression(&mut self, term: &Object, depth: usize) -> Result<Option<ClassExpression>> {
        let node = match term {
            Object::Node(node) => node,
            Object::Literal { .. } => return Ok(None),
        };
        let blank = match node {
            Node::Iri(iri) => {
                if !self.ontology.ensure_class(iri)? {
                    debug!(iri = %iri, "not a class, reference ignored");
                    return Ok(None);
                }
                return Ok(Some(ClassExpression::named(iri.as_str())));
            }
            Node::Blank(_) if depth > 32 => return Ok(None),
            Node::Blank(_) => node,
        };
        let document = self.document;
        for (predicate, object) in document.statements(blank) {
            let combinator: fn(Vec<ClassExpression>) -> ClassExpression =
                if *predicate == owl("intersectionOf") {
                    ClassExpression::IntersectionOf
                } else if *predicate == owl("unionOf") {
                    ClassExpression::UnionOf
                } else if *predicate == owl("complementOf") {
                    let inner = self.expression(object, depth + 1)?;
                    return Ok(inner.map(|i| ClassExpression::ComplementOf(Box::new(i))));
                } else {
                    continue;
                };
            let Object::Node(head) = object else { continue };
            let mut members = Vec::new();
            for member in document.list(head) {
                if let Some(expression) = self.expression(member, depth + 1)? {
                    members.push(expression);
                }
            }
            return Ok(Some(combinator(members)));
        }
        debug!("unsupported class expression ignored");
        Ok(None)
    }

    /// Several expressions for the same slot are read as their intersection.
    fn slot(&mut self, subject: &Node, predicate: &str) -> Result<Option<ClassExpression>> {
        let document = self.document;
        let mut expressions = Vec::new();
        for object in document.objects(subject, predicate) {
            if let Some(expression) = self.expression(object, 0)? {
                expressions.push(expression);
            }
        }
        Ok(match expressions.len() {
            0 => None,
            1 => expressions.pop(),
            _ => Some(ClassExpression::IntersectionOf(expressions)),
        })
    }

    fn link_class(&mut self, iri: &str, subject: &Node) -> Result<()> {
        let document = self.document;
        for object in document.objects(subject, &rdfs("subClassOf")) {
            match self.expression(object, 0)? {
                Some(ClassExpression::Named(parent)) => self.ontology.classes.add_parent(iri, &parent)?,
                Some(expression) => self.ontology.classes.add_anonymous_parent(iri, expression)?,
                None => {}
            }
        }
        Ok(())
    }

    fn link_property(&mut self, iri: &str, subject: &Node) -> Result<()> {
        let document = self.document;
        let domain = self.slot(subject, &rdfs("domain"))?;
        let range = match self.kinds.get(iri).copied() {
            Some(EntityKind::ObjectProperty) => self.slot(subject, &rdfs("range"))?.map(Range::Classes),
            Some(EntityKind::DataProperty) => document
                .iri_objects(subject, &rdfs("range"))
                .find_map(|dt| {
                    let datatype = Datatype::from_iri(dt);
                    if datatype.is_none() {
                        debug!(property = iri, datatype = dt, "unsupported range dropped");
                    }
                    datatype
                })
                .map(Range::Datatype),
            _ => None,
        };
        let characteristics: Vec<Characteristic> = document
            .iri_objects(subject, &rdf("type"))
            .filter_map(Characteristic::from_iri)
            .collect();
        let parents: Vec<String> = document
            .iri_objects(subject, &rdfs("subPropertyOf"))
            .filter(|p| self.kinds.get(*p).is_some_and(EntityKind::is_property))
            .map(str::to_owned)
            .collect();
        let kind = self.kinds.get(iri).copied();
        let Some(record) = self.ontology.properties.get_mut(iri) else {
            return Ok(());
        };
        if let Some(domain) = domain {
            record.set_domain(domain);
        }
        if let Some(range) = range {
            record.set_range(range);
        }
        if kind != Some(EntityKind::AnnotationProperty) {
            for characteristic in characteristics {
                record.add_characteristic(characteristic);
            }
        }
        for parent in parents {
            record.add_super_property(&parent);
        }
        Ok(())
    }

    fn link_individual(&mut self, iri: &str, subject: &Node) -> Result<()> {
        let document = self.document;
        let rdf_type = rdf("type");
        let (same_as, different_from) = (owl("sameAs"), owl("differentFrom"));
        for (predicate, object) in document.statements(subject) {
            if *predicate == rdf_type {
                let named_individual = matches!(object, Object::Node(Node::Iri(t)) if *t == owl("NamedIndividual"));
                if named_individual {
                    continue;
                }
                if let Some(expression) = self.expression(object, 0)? {
                    if let Some(record) = self.ontology.individuals.get_mut(iri) {
                        record.add_type(expression);
                    }
                }
                continue;
            }
            let target = match object {
                Object::Node(Node::Iri(target))
                    if self.kinds.get(target) == Some(&EntityKind::Individual) =>
                {
                    Some(target.as_str())
                }
                _ => None,
            };
            let kind = self.kinds.get(predicate).copied();
            let annotation = match (kind, object) {
                (Some(EntityKind::AnnotationProperty), Object::Node(Node::Blank(_))) => self
                    .expression(object, 0)?
                    .map(AnnotationValue::Expression),
                _ => None,
            };
            let functional = self.ontology.properties.is_functional(predicate);
            let Some(record) = self.ontology.individuals.get_mut(iri) else {
                continue;
            };
            match (kind, object) {
                (Some(EntityKind::DataProperty), Object::Literal { lexical, datatype, lang }) => {
                    let literal = Literal::from_rdf(lexical, datatype.as_deref(), lang.as_deref());
                    record.assert_data(predicate, literal, functional);
                }
                (Some(EntityKind::ObjectProperty), _) => match target {
                    Some(target) => record.assert_object(predicate, target, functional),
                    None => debug!(individual = iri, property = %predicate, "object assertion skipped"),
                },
                (Some(EntityKind::AnnotationProperty), Object::Literal { lexical, datatype, lang }) => {
                    let literal = Literal::from_rdf(lexical, datatype.as_deref(), lang.as_deref());
                    record.annotate(predicate, AnnotationValue::Literal(literal));
                }
                (Some(EntityKind::AnnotationProperty), Object::Node(Node::Iri(resource))) => {
                    record.annotate(predicate, AnnotationValue::Resource(resource.clone()));
                }
                (Some(EntityKind::AnnotationProperty), _) => {
                    if let Some(value) = annotation {
                        record.annotate(predicate, value);
                    }
                }
                _ if *predicate == same_as => {
                    if let Some(other) = target {
                        record.add_same_as(other);
                    }
                }
                _ if *predicate == different_from => {
                    if let Some(other) = target {
                        record.add_different_from(other);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

// ------------- Encoding -------------
struct Encoder<'o> {
    ontology: &'o Ontology,
    writer: Writer<Vec<u8>>,
    prefixes: BiMap<String, String>,
}

impl<'o> Encoder<'o> {
    /// Declares a prefix for the namespace of every predicate used in an
    /// assertion. A predicate that cannot be split gets none, and only the
    /// assertions using it fail to encode.
    fn new(ontology: &'o Ontology) -> Self {
        let mut prefixes = BiMap::new();
        for (prefix, namespace) in [("rdf", RDF), ("rdfs", RDFS), ("owl", OWL), ("xsd", XSD)] {
            prefixes.insert(prefix.to_owned(), namespace.to_owned());
        }
        let mut predicates: Vec<&str> = Vec::new();
        for entity in ontology.entities().of_kind(EntityKind::Individual) {
            if let Some(record) = ontology.individuals().get(entity.iri()) {
                predicates.extend(record.data().keys().map(String::as_str));
                predicates.extend(record.objects().keys().map(String::as_str));
                predicates.extend(record.annotations().keys().map(String::as_str));
            }
        }
        for predicate in predicates {
            let Ok((namespace, _)) = split_iri(predicate) else {
                continue;
            };
            if !prefixes.contains_right(namespace) {
                let prefix = format!("ns{}", prefixes.len() - 4);
                prefixes.insert(prefix, namespace.to_owned());
            }
        }
        Self {
            ontology,
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
            prefixes,
        }
    }

    fn write(mut self) -> Result<Vec<u8>> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("rdf:RDF");
        let mut declared: Vec<(&String, &String)> = self.prefixes.iter().collect();
        declared.sort();
        for (prefix, namespace) in declared {
            root.push_attribute((format!("xmlns:{prefix}").as_str(), namespace.as_str()));
        }
        self.writer.write_event(Event::Start(root))?;
        self.empty("owl:Ontology", &[("rdf:about", self.ontology.iri())])?;

        let ontology = self.ontology;
        for entity in ontology.entities().iter() {
            match entity.kind() {
                EntityKind::Class => self.write_class(entity)?,
                EntityKind::Individual => self.write_individual(entity)?,
                _ => self.write_property(entity)?,
            }
        }
        self.close("rdf:RDF")?;
        Ok(self.writer.into_inner())
    }

    fn open(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(tag);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }
    fn empty(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(tag);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }
    fn close(&mut self, tag: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }
    fn text(&mut self, tag: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        self.open(tag, attributes)?;
        // an empty Text event keeps <tag></tag> instead of collapsing it
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.close(tag)
    }

    fn qname(&self, iri: &str) -> Result<String> {
        let (namespace, local) = split_iri(iri)?;
        let prefix = self
            .prefixes
            .get_by_right(namespace)
            .ok_or_else(|| OntographError::Codec(format!("no prefix for namespace '{namespace}'")))?;
        Ok(format!("{prefix}:{local}"))
    }

    fn write_label(&mut self, entity: &Entity) -> Result<()> {
        if let Some(label) = entity.label() {
            self.text("rdfs:label", &[], label)?;
        }
        if let Some(comment) = entity.comment() {
            self.text("rdfs:comment", &[], comment)?;
        }
        Ok(())
    }

    fn write_literal(&mut self, tag: &str, literal: &Literal) -> Result<()> {
        let lexical = literal.lexical();
        match (literal.value(), literal.lang()) {
            (Value::String(_), Some(lang)) => self.text(tag, &[("xml:lang", lang)], &lexical),
            _ => match literal.datatype_iri() {
                Some(datatype) => self.text(tag, &[("rdf:datatype", datatype.as_str())], &lexical),
                None => self.text(tag, &[], &lexical),
            },
        }
    }

    /// A class expression as a node element.
    fn write_expression(&mut self, expression: &ClassExpression) -> Result<()> {
        match expression {
            ClassExpression::Named(iri) => self.empty("rdf:Description", &[("rdf:about", iri.as_str())]),
            ClassExpression::IntersectionOf(members) | ClassExpression::UnionOf(members) => {
                let tag = if matches!(expression, ClassExpression::UnionOf(_)) {
                    "owl:unionOf"
                } else {
                    "owl:intersectionOf"
                };
                self.open("owl:Class", &[])?;
                self.open(tag, &[("rdf:parseType", "Collection")])?;
                for member in members {
                    self.write_expression(member)?;
                }
                self.close(tag)?;
                self.close("owl:Class")
            }
            ClassExpression::ComplementOf(inner) => {
                self.open("owl:Class", &[])?;
                self.write_slot("owl:complementOf", inner)?;
                self.close("owl:Class")
            }
        }
    }

    /// A property element whose object is a class expression.
    fn write_slot(&mut self, tag: &str, expression: &ClassExpression) -> Result<()> {
        match expression {
            ClassExpression::Named(iri) => self.empty(tag, &[("rdf:resource", iri.as_str())]),
            _ => {
                self.open(tag, &[])?;
                self.write_expression(expression)?;
                self.close(tag)
            }
        }
    }

    fn write_class(&mut self, entity: &Entity) -> Result<()> {
        self.open("owl:Class", &[("rdf:about", entity.iri())])?;
        self.write_label(entity)?;
        if let Some(record) = self.ontology.classes().get(entity.iri()) {
            for parent in record.parents().iter().filter(|p| *p != THING_IRI) {
                self.empty("rdfs:subClassOf", &[("rdf:resource", parent.as_str())])?;
            }
            for expression in record.anonymous_parents() {
                self.write_slot("rdfs:subClassOf", expression)?;
            }
        }
        self.close("owl:Class")
    }

    fn write_property(&mut self, entity: &Entity) -> Result<()> {
        let tag = match entity.kind() {
            EntityKind::ObjectProperty => "owl:ObjectProperty",
            EntityKind::DataProperty => "owl:DatatypeProperty",
            _ => "owl:AnnotationProperty",
        };
        self.open(tag, &[("rdf:about", entity.iri())])?;
        if let Some(record) = self.ontology.properties().get(entity.iri()) {
            for characteristic in record.characteristics() {
                self.empty("rdf:type", &[("rdf:resource", characteristic.owl_iri().as_str())])?;
            }
            self.write_label(entity)?;
            for parent in record.super_properties() {
                self.empty("rdfs:subPropertyOf", &[("rdf:resource", parent.as_str())])?;
            }
            if let Some(domain) = record.domain() {
                self.write_slot("rdfs:domain", domain)?;
            }
            match record.range() {
                Range::Classes(range) => self.write_slot("rdfs:range", range)?,
                Range::Datatype(datatype) => {
                    self.empty("rdfs:range", &[("rdf:resource", datatype.iri().as_str())])?
                }
                Range::Unspecified => {}
            }
        } else {
            self.write_label(entity)?;
        }
        self.close(tag)
    }

    fn write_individual(&mut self, entity: &Entity) -> Result<()> {
        self.open("owl:NamedIndividual", &[("rdf:about", entity.iri())])?;
        self.write_label(entity)?;
        let Some(record) = self.ontology.individuals().get(entity.iri()) else {
            return self.close("owl:NamedIndividual");
        };
        for expression in record.types() {
            self.write_slot("rdf:type", expression)?;
        }
        for (property, literals) in record.data() {
            let tag = self.qname(property)?;
            for literal in literals {
                self.write_literal(&tag, literal)?;
            }
        }
        for (property, targets) in record.objects() {
            let tag = self.qname(property)?;
            for target in targets {
                self.empty(&tag, &[("rdf:resource", target.as_str())])?;
            }
        }
        for (property, values) in record.annotations() {
            let tag = self.qname(property)?;
            for value in values {
                match value {
                    AnnotationValue::Literal(literal) => self.write_literal(&tag, literal)?,
                    AnnotationValue::Resource(iri) => self.empty(&tag, &[("rdf:resource", iri.as_str())])?,
                    AnnotationValue::Expression(expression) => self.write_slot(&tag, expression)?,
                }
            }
        }
        for other in record.same_as() {
            self.empty("owl:sameAs", &[("rdf:resource", other.as_str())])?;
        }
        for other in record.different_from() {
            self.empty("owl:differentFrom", &[("rdf:resource", other.as_str())])?;
        }
        self.close("owl:NamedIndividual")
    }
}

/// Splits an IRI into namespace and local name so it can be written as a QName.
fn split_iri(iri: &str) -> Result<(&str, &str)> {
    let captures = LOCAL_PART
        .captures(iri)
        .ok_or_else(|| OntographError::Codec(format!("'{iri}' cannot be written as an element name")))?;
    match (captures.get(1), captures.get(2)) {
        (Some(namespace), Some(local)) if !namespace.as_str().is_empty() => {
            Ok((namespace.as_str(), local.as_str()))
        }
        _ => Err(OntographError::Codec(format!(
            "'{iri}' cannot be written as an element name"
        ))),
    }
}
