//! Durable storage of the whole graph through a pluggable codec.
//!
//! The persistor never writes diffs: every commit encodes the complete
//! ontology and replaces the previous durable copy. A `blake3` digest of the
//! last committed bytes serves as the head of the store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::construct::Ontology;
use crate::error::{OntographError, Result};
use crate::rdfxml::RdfXmlCodec;

/// Turns a graph into durable bytes and back.
pub trait Codec: Send + Sync {
    fn encode(&self, ontology: &Ontology) -> Result<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> Result<Ontology>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistenceMode {
    /// Keeps the last committed encoding in memory only.
    InMemory,
    /// Writes every commit to this file.
    File(String),
}

/// A rendered export, ready to be handed to a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub written_to: Option<PathBuf>,
}

pub struct Persistor {
    mode: PersistenceMode,
    codec: Box<dyn Codec>,
    export_dir: Option<PathBuf>,
    stored: Option<Vec<u8>>,
    head: Option<blake3::Hash>,
}

impl Persistor {
    pub fn new(mode: PersistenceMode) -> Self {
        Self::with_codec(mode, Box::new(RdfXmlCodec::default()))
    }
    pub fn with_codec(mode: PersistenceMode, codec: Box<dyn Codec>) -> Self {
        Self {
            mode,
            codec,
            export_dir: None,
            stored: None,
            head: None,
        }
    }
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }
    pub fn mode(&self) -> &PersistenceMode {
        &self.mode
    }
    pub fn decode(&self, bytes: &[u8]) -> Result<Ontology> {
        self.codec.decode(bytes)
    }
    pub fn encode(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        self.codec.encode(ontology)
    }
    /// Stores the document a graph was loaded from as the durable copy.
    pub fn store(&mut self, bytes: &[u8]) -> Result<blake3::Hash> {
        self.write(bytes)
    }
    /// Encodes the full graph and makes it the durable copy.
    pub fn commit(&mut self, ontology: &Ontology) -> Result<blake3::Hash> {
        let bytes = self.encode_for_storage(ontology)?;
        self.write(&bytes)
    }
    // a graph the codec cannot write is a failure of the store, not of the request
    fn encode_for_storage(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        self.codec.encode(ontology).map_err(|e| match e {
            OntographError::Codec(message) => {
                OntographError::Persistence(format!("could not encode the graph: {message}"))
            }
            other => other,
        })
    }
    fn write(&mut self, bytes: &[u8]) -> Result<blake3::Hash> {
        let hash = blake3::hash(bytes);
        match &self.mode {
            PersistenceMode::InMemory => {
                self.stored = Some(bytes.to_vec());
            }
            PersistenceMode::File(path) => {
                write_replacing(Path::new(path), bytes).map_err(|e| {
                    OntographError::Persistence(format!("could not write '{path}': {e}"))
                })?;
            }
        }
        debug!(bytes = bytes.len(), head = %hash.to_hex(), "durable commit");
        self.head = Some(hash);
        Ok(hash)
    }
    /// The last committed bytes, if anything was committed.
    pub fn stored(&self) -> Result<Option<Vec<u8>>> {
        match &self.mode {
            PersistenceMode::InMemory => Ok(self.stored.clone()),
            PersistenceMode::File(path) => {
                if self.head.is_none() {
                    return Ok(None);
                }
                Ok(Some(fs::read(path)?))
            }
        }
    }
    /// Hex digest of the last committed bytes.
    pub fn current_digest(&self) -> Option<String> {
        self.head.map(|h| h.to_hex().to_string())
    }
    /// Encodes the graph for download under a name ending in `.owl`, also
    /// writing it into the export directory when one is configured.
    pub fn export(&self, ontology: &Ontology, filename: &str) -> Result<Export> {
        let filename = export_filename(filename);
        let bytes = self.encode_for_storage(ontology)?;
        let written_to = match &self.export_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let path = dir.join(&filename);
                fs::write(&path, &bytes)?;
                info!(path = %path.display(), bytes = bytes.len(), "ontology exported");
                Some(path)
            }
            None => None,
        };
        Ok(Export {
            filename,
            bytes,
            written_to,
        })
    }
}

impl std::fmt::Debug for Persistor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistor")
            .field("mode", &self.mode)
            .field("export_dir", &self.export_dir)
            .field("head", &self.current_digest())
            .finish()
    }
}

/// Keeps only the final path component and makes sure it ends with `.owl`.
pub fn export_filename(requested: &str) -> String {
    let name = Path::new(requested.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if name.is_empty() {
        return "ontology.owl".to_owned();
    }
    if name.ends_with(".owl") {
        name.to_owned()
    } else {
        format!("{name}.owl")
    }
}

// Write to a sibling temp file first so a failed write never truncates the last commit.
fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);
    fs::write(&temp, bytes)?;
    fs::rename(&temp, path)
}
