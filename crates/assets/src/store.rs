use crate::obj::{decode_obj, MeshData};
use cityview_common::EntityKind;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Content-addressed mesh ID computed from the mesh data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("mesh not found: {0:?}")]
    NotFound(AssetId),
    #[error("OBJ parse error: {0}")]
    ObjParse(String),
}

/// Content-addressed mesh registry with per-kind bindings.
///
/// Identical mesh data registers to the same id, so re-importing a file is
/// harmless. Every kind starts bound to the built-in unit cube; a
/// successful OBJ import rebinds it.
#[derive(Debug, Clone)]
pub struct MeshStore {
    meshes: BTreeMap<AssetId, MeshData>,
    bindings: BTreeMap<EntityKind, AssetId>,
}

impl MeshStore {
    /// Create a store with every kind bound to the unit cube fallback.
    pub fn new() -> Self {
        let mut store = Self {
            meshes: BTreeMap::new(),
            bindings: BTreeMap::new(),
        };
        let cube = store.register(MeshData::unit_cube());
        for kind in EntityKind::ALL {
            store.bindings.insert(kind, cube);
        }
        store
    }

    /// Register a mesh and return its content-addressed id.
    pub fn register(&mut self, mesh: MeshData) -> AssetId {
        let id = content_hash(&mesh);
        self.meshes.insert(id, mesh);
        id
    }

    pub fn get(&self, id: AssetId) -> Option<&MeshData> {
        self.meshes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Bind a kind to a registered mesh.
    pub fn bind(&mut self, kind: EntityKind, id: AssetId) -> Result<(), AssetError> {
        if !self.meshes.contains_key(&id) {
            return Err(AssetError::NotFound(id));
        }
        self.bindings.insert(kind, id);
        Ok(())
    }

    /// The mesh currently bound to a kind. Every kind always has one.
    pub fn mesh_for(&self, kind: EntityKind) -> &MeshData {
        let id = self.bindings[&kind];
        &self.meshes[&id]
    }

    /// Import an OBJ file and bind it to `kind`.
    ///
    /// On failure the kind keeps its current binding (the cube fallback at
    /// startup) and the error is returned for logging; the render loop is
    /// unaffected.
    pub fn import_obj(&mut self, kind: EntityKind, path: impl AsRef<Path>) -> Result<AssetId, AssetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("mesh")
            .to_string();
        let mesh = decode_obj(&name, &text)?;
        tracing::info!(
            kind = kind.name(),
            mesh = %mesh.name,
            vertices = mesh.vertex_count(),
            "mesh imported"
        );
        let id = self.register(mesh);
        self.bindings.insert(kind, id);
        Ok(id)
    }
}

impl Default for MeshStore {
    fn default() -> Self {
        Self::new()
    }
}

fn content_hash(mesh: &MeshData) -> AssetId {
    let mut hasher = Sha256::new();
    hasher.update(mesh.name.as_bytes());
    for p in &mesh.positions {
        for c in p {
            hasher.update(c.to_le_bytes());
        }
    }
    for n in &mesh.normals {
        for c in n {
            hasher.update(c.to_le_bytes());
        }
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}
