//! Durable layout storage contract.
//!
//! Only room layouts survive a restart; undo history and selection are
//! ephemeral and never pass through here. The engine does not own a storage
//! backend: embedders implement [`LayoutRepository`] over whatever key-value
//! or document store they have. Two encodings are provided, JSON for
//! human-readable stores and MessagePack for compact blobs.

use crate::error::{LayoutError, Result};
use crate::id::RoomId;
use crate::model::RoomLayout;
use std::collections::BTreeMap;

/// Every persisted layout, keyed by room.
pub type LayoutDocument = BTreeMap<RoomId, RoomLayout>;

// ─── Codecs ──────────────────────────────────────────────────────────────

pub fn encode_json(layout: &RoomLayout) -> Result<String> {
    Ok(serde_json::to_string(layout)?)
}

pub fn decode_json(text: &str) -> Result<RoomLayout> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_document_json(document: &LayoutDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

pub fn decode_document_json(text: &str) -> Result<LayoutDocument> {
    Ok(serde_json::from_str(text)?)
}

/// MessagePack with named fields, so blobs stay readable across field
/// reordering.
pub fn encode_msgpack(layout: &RoomLayout) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(layout)?)
}

pub fn decode_msgpack(bytes: &[u8]) -> Result<RoomLayout> {
    Ok(rmp_serde::from_slice(bytes)?)
}

// ─── Repository ──────────────────────────────────────────────────────────

/// Key-value store of layouts by room id.
pub trait LayoutRepository {
    /// Load every stored layout.
    fn load_all(&self) -> Result<LayoutDocument>;

    /// Insert or replace the layout of `room`.
    fn save(&mut self, room: RoomId, layout: &RoomLayout) -> Result<()>;

    /// Forget `room`'s layout. Deleting a missing room is not an error.
    fn delete(&mut self, room: RoomId) -> Result<()>;
}

/// In-process repository holding MessagePack blobs.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    blobs: BTreeMap<RoomId, Vec<u8>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn contains(&self, room: RoomId) -> bool {
        self.blobs.contains_key(&room)
    }

    /// Store a raw blob, bypassing the encoder (for corrupt-data tests and
    /// migrations).
    pub fn insert_raw(&mut self, room: RoomId, blob: Vec<u8>) {
        self.blobs.insert(room, blob);
    }
}

impl LayoutRepository for MemoryRepository {
    fn load_all(&self) -> Result<LayoutDocument> {
        self.blobs
            .iter()
            .map(|(room, blob)| {
                let layout = decode_msgpack(blob).map_err(|e| {
                    LayoutError::Repository(format!("room {room}: {e}"))
                })?;
                Ok((*room, layout))
            })
            .collect()
    }

    fn save(&mut self, room: RoomId, layout: &RoomLayout) -> Result<()> {
        let blob = encode_msgpack(layout)?;
        log::debug!("persist: saved {room} ({} bytes)", blob.len());
        self.blobs.insert(room, blob);
        Ok(())
    }

    fn delete(&mut self, room: RoomId) -> Result<()> {
        if self.blobs.remove(&room).is_some() {
            log::debug!("persist: deleted {room}");
        }
        Ok(())
    }
}
