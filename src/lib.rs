//! Ontograph – an editable OWL ontology store with a small HTTP surface.
//!
//! A single ontology graph lives in memory. It is loaded from an RDF/XML
//! document, grown through a closed set of structural commands, and exported
//! back to RDF/XML. The graph is made of:
//! * [`construct::Entity`] – anything with an IRI: a class, one of three
//!   property kinds, or an individual. Entities are owned by an
//!   [`construct::EntityKeeper`] that guarantees IRI uniqueness.
//! * The class hierarchy ([`hierarchy::ClassKeeper`]) – a cycle-free
//!   subclass graph rooted in `owl:Thing`.
//! * The property registry ([`registry::PropertyKeeper`]) – domains, ranges
//!   (class expressions or an XSD datatype) and characteristics.
//! * The individual store ([`individual::IndividualKeeper`]) – types, data
//!   and object assertions, annotations and identity assertions.
//!
//! Following the "keeper" pattern, every keeper owns its records and exposes
//! lookup indexes, and [`construct::Ontology`] wires the keepers together.
//!
//! ## Modules
//! * [`construct`] – Entities, IRIs, class expressions and the ontology itself.
//! * [`datatype`] – Typed literals and the coercion of raw values to XSD datatypes.
//! * [`hierarchy`] – Class creation, subclass edges and the class tree.
//! * [`registry`] – Object, data and annotation property creation.
//! * [`individual`] – Individual creation with per-assertion outcomes.
//! * [`relationship`] – Adding, removing and replacing object property edges.
//! * [`engine`] – The [`engine::Command`] set and the staged, atomic [`engine::Engine`].
//! * [`persist`] – The [`persist::Persistor`] and its pluggable [`persist::Codec`].
//! * [`rdfxml`] – The RDF/XML codec.
//! * [`serialize`] – Read-side views rendered as JSON.
//! * [`interface`] – The locked operation surface used by transports.
//! * [`settings`] – Layered file and environment configuration.
//! * [`server`] – The HTTP router.
//!
//! ## Identifier resolution
//! Requests name entities by local name ("Dog"), by full IRI or by label.
//! Resolution tries an exact IRI match, then an IRI ending in the identifier,
//! then an exact label. Mandatory identifiers that resolve to nothing fail
//! the whole command; optional assertions are skipped and reported.
//!
//! ## Atomicity
//! Every command runs against a staged copy of the graph. The copy is
//! encoded and committed through the persistor before it replaces the live
//! graph, so a failed command (or a failed commit) leaves nothing behind.
//!
//! ## Quick Start
//! ```
//! use ontograph::construct::Ontology;
//! use ontograph::engine::{ClassSpec, Command, Engine};
//! use ontograph::persist::{PersistenceMode, Persistor};
//! let mut engine = Engine::new(Persistor::new(PersistenceMode::InMemory));
//! let empty = engine.persistor().encode(&Ontology::new("http://example.org/zoo")).unwrap();
//! engine.load(&empty).unwrap();
//! engine
//!     .execute(&Command::CreateClass(ClassSpec { name: "Animal".into(), parents: vec![] }))
//!     .unwrap();
//! assert!(engine.ontology().unwrap().resolve_class("Animal").is_some());
//! ```

pub mod construct;
pub mod datatype;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod individual;
pub mod interface;
pub mod persist;
pub mod rdfxml;
pub mod registry;
pub mod relationship;
pub mod serialize;
pub mod server;
pub mod settings;
