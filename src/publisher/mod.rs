//! `FilterConfigPublisher`: writes the built runtime-configuration document
//! as one index secret plus a fixed number of chunk secrets. `spec.md`
//! §4.7, §9 ("Configuration chunking").

mod error;

pub use error::PublisherError;

use crate::domain::Secret;
use crate::naming;
use crate::store::{NamespacedName, ObjectMeta, ObjectStore, TypedStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `spec.md` §4.7: "Split the document into `ceil(len/PART_SIZE)` chunks
/// where `PART_SIZE = 700 KiB`."
pub const PART_SIZE: usize = 700 * 1024;

/// Fixed mount-slot count: the contract with the external processor's
/// mount layout (`spec.md` §9). Every slot is always written, even if
/// empty, so the processor never has to remount a volume.
pub const MAX_SLOTS: usize = 8;

const DATA_KEY_CHUNK: &str = "chunk";
const DATA_KEY_INDEX: &str = "index.json";
const MOUNT_PREFIX: &str = "/etc/aigateway/filterconfig";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartEntry {
    pub name: String,
    pub volume: String,
    pub path: String,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BundleIndex {
    pub version: String,
    pub uuid: Uuid,
    pub checksum: String,
    pub parts: Vec<PartEntry>,
}

fn chunk_secret_name(gateway: &NamespacedName, slot: usize) -> String {
    naming::object_name(
        &format!("{}-filterconfig-chunk-{slot}", gateway.name),
        &gateway.dotted(),
    )
}

/// Volume mounted into the external processor's pod for a chunk slot.
/// §4.7: same derivation as the secret's object name, truncated to the
/// 63-char volume-name limit with a fixed suffix.
fn chunk_volume_name(gateway: &NamespacedName, slot: usize) -> String {
    naming::volume_name(
        &format!("{}-filterconfig-chunk-{slot}", gateway.name),
        &gateway.dotted(),
    )
}

fn index_secret_name(gateway: &NamespacedName) -> String {
    naming::object_name(&format!("{}-filterconfig-index", gateway.name), &gateway.dotted())
}

pub struct FilterConfigPublisher<'a> {
    store: &'a ObjectStore,
}

impl<'a> FilterConfigPublisher<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Publishes `document_bytes` for `gateway` into `gateway_system_namespace`.
    /// Fails without touching any secret if the document needs more than
    /// [`MAX_SLOTS`] chunks.
    pub async fn publish(
        &self,
        gateway: &NamespacedName,
        gateway_system_namespace: &str,
        build_uuid: Uuid,
        checksum: &str,
        document_bytes: &[u8],
    ) -> Result<(), PublisherError> {
        let chunks: Vec<&[u8]> = if document_bytes.is_empty() {
            vec![&document_bytes[0..0]]
        } else {
            document_bytes.chunks(PART_SIZE).collect()
        };
        if chunks.len() > MAX_SLOTS {
            return Err(PublisherError::ExceedsMaxSlots(chunks.len(), MAX_SLOTS));
        }

        let mut parts = Vec::with_capacity(chunks.len());
        for slot in 0..MAX_SLOTS {
            let name = chunk_secret_name(gateway, slot);
            let content = chunks.get(slot).copied().unwrap_or(&[]);
            // Hex-encode rather than store raw bytes as a lossy UTF-8 string:
            // chunk boundaries fall on arbitrary byte offsets and can split a
            // multi-byte character, which `from_utf8_lossy` would silently
            // replace with U+FFFD and corrupt the reconstructed document.
            let mut data = std::collections::HashMap::new();
            data.insert(DATA_KEY_CHUNK.to_string(), hex::encode(content));

            self.store
                .secrets
                .apply(Secret {
                    meta: ObjectMeta {
                        namespace: gateway_system_namespace.to_string(),
                        name: name.clone(),
                        ..Default::default()
                    },
                    data,
                })
                .await?;

            if slot < chunks.len() {
                let volume = chunk_volume_name(gateway, slot);
                parts.push(PartEntry {
                    path: format!("{MOUNT_PREFIX}/{volume}/{name}"),
                    volume,
                    name,
                    size_bytes: content.len(),
                });
            }
        }

        let index = BundleIndex {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uuid: build_uuid,
            checksum: checksum.to_string(),
            parts,
        };
        let mut data = std::collections::HashMap::new();
        data.insert(DATA_KEY_INDEX.to_string(), serde_json::to_string(&index)?);

        self.store
            .secrets
            .apply(Secret {
                meta: ObjectMeta {
                    namespace: gateway_system_namespace.to_string(),
                    name: index_secret_name(gateway),
                    ..Default::default()
                },
                data,
            })
            .await?;

        Ok(())
    }

    pub async fn read_index(
        &self,
        gateway: &NamespacedName,
        gateway_system_namespace: &str,
    ) -> Result<Option<BundleIndex>, PublisherError> {
        let key = NamespacedName::new(gateway_system_namespace.to_string(), index_secret_name(gateway));
        let Some(secret) = self.store.secrets.get(&key).await? else {
            return Ok(None);
        };
        let Some(raw) = secret.data.get(DATA_KEY_INDEX) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(raw)?))
    }

    /// Returns the chunk's raw bytes, hex-decoded from the secret's stored
    /// form. Byte-for-byte, regardless of where the chunk boundary fell in
    /// the original document.
    pub async fn read_chunk(
        &self,
        gateway: &NamespacedName,
        gateway_system_namespace: &str,
        slot: usize,
    ) -> Result<Option<Vec<u8>>, PublisherError> {
        let key = NamespacedName::new(
            gateway_system_namespace.to_string(),
            chunk_secret_name(gateway, slot),
        );
        let Some(secret) = self.store.secrets.get(&key).await? else {
            return Ok(None);
        };
        let Some(raw) = secret.data.get(DATA_KEY_CHUNK) else {
            return Ok(None);
        };
        Ok(Some(hex::decode(raw).map_err(|e| PublisherError::CorruptChunk(e.to_string()))?))
    }
}
