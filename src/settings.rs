//! Runtime settings, read from an optional TOML file layered under
//! `ONTOGRAPH__*` environment variables (`ONTOGRAPH__SERVER__PORT=9000`).

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::construct::DEFAULT_ONTOLOGY_IRI;
use crate::error::{OntographError, Result};
use crate::persist::{PersistenceMode, Persistor};
use crate::rdfxml::RdfXmlCodec;

pub const DEFAULT_SETTINGS_FILE: &str = "ontograph.toml";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub ontology: OntologySettings,
    pub logging: LoggingSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Memory,
    File,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StorageSettings {
    pub mode: StorageMode,
    /// Working ontology file, used in `file` mode.
    pub path: String,
    pub export_dir: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OntologySettings {
    /// IRI given to documents that declare no `owl:Ontology`.
    pub base_iri: String,
    /// RDF/XML file loaded at startup.
    pub preload: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Settings {
    /// Reads `path` if it exists, then applies the environment on top.
    pub fn load(path: &str) -> Result<Self> {
        Self::builder(path)?
            .add_source(Environment::with_prefix("ONTOGRAPH").separator("__"))
            .build()?
            .try_deserialize()
            .map_err(OntographError::from)
    }

    /// Defaults and the optional file, without the environment.
    pub fn from_file(path: &str) -> Result<Self> {
        Self::builder(path)?
            .build()?
            .try_deserialize()
            .map_err(OntographError::from)
    }

    fn builder(path: &str) -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("storage.mode", "memory")?
            .set_default("storage.path", "ontology.owl")?
            .set_default("ontology.base_iri", DEFAULT_ONTOLOGY_IRI)?
            .set_default("logging.filter", "info")?
            .add_source(File::with_name(path).required(false)))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        match self.storage.mode {
            StorageMode::Memory => PersistenceMode::InMemory,
            StorageMode::File => PersistenceMode::File(self.storage.path.clone()),
        }
    }

    pub fn persistor(&self) -> Persistor {
        let codec = RdfXmlCodec::new(&self.ontology.base_iri);
        let persistor = Persistor::with_codec(self.persistence_mode(), Box::new(codec));
        match &self.storage.export_dir {
            Some(dir) => persistor.with_export_dir(PathBuf::from(dir)),
            None => persistor,
        }
    }
}
