//! Devices currently known to the engine.
//!
//! The receiver path and every direct stream may run on their own threads, so
//! this is the one structure they share. Sessions themselves are never shared;
//! the registry only holds a summary of each.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use riffbridge_gip_protocol::DeviceId;
use riffbridge_mappers::MapperKind;
use tracing::debug;

/// How a device reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceKey {
    /// Relayed by a wireless receiver, identified by its transmitter address
    Receiver(DeviceId),
    /// Attached on its own pipe, identified by stream number
    Direct(u64),
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKey::Receiver(id) => write!(f, "receiver/{id}"),
            DeviceKey::Direct(n) => write!(f, "direct/{n}"),
        }
    }
}

/// Summary of one device's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub key: DeviceKey,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub mapper: Option<MapperKind>,
    pub registered_at: Instant,
}

impl DeviceInfo {
    pub fn new(key: DeviceKey) -> Self {
        Self {
            key,
            vendor_id: None,
            product_id: None,
            mapper: None,
            registered_at: Instant::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: RwLock<HashMap<DeviceKey, DeviceInfo>>,
    next_stream: AtomicU64,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number for a new direct stream; unique for the registry's lifetime.
    pub fn allocate_stream_id(&self) -> u64 {
        self.next_stream.fetch_add(1, Ordering::Relaxed)
    }

    /// Add a device. Returns false if the key was already present, in which
    /// case the existing entry is left alone.
    pub fn register(&self, key: DeviceKey) -> bool {
        let mut devices = self.devices.write();
        if devices.contains_key(&key) {
            return false;
        }
        devices.insert(key, DeviceInfo::new(key));
        debug!(device = %key, "device registered");
        true
    }

    /// Apply `update` to an existing entry. Returns false if it is unknown.
    pub fn update(&self, key: DeviceKey, update: impl FnOnce(&mut DeviceInfo)) -> bool {
        match self.devices.write().get_mut(&key) {
            Some(info) => {
                update(info);
                true
            }
            None => false,
        }
    }

    pub fn unregister(&self, key: DeviceKey) -> Option<DeviceInfo> {
        let removed = self.devices.write().remove(&key);
        if removed.is_some() {
            debug!(device = %key, "device unregistered");
        }
        removed
    }

    pub fn get(&self, key: DeviceKey) -> Option<DeviceInfo> {
        self.devices.read().get(&key).cloned()
    }

    /// Every entry, ordered by key.
    pub fn devices(&self) -> Vec<DeviceInfo> {
        let mut all: Vec<DeviceInfo> = self.devices.read().values().cloned().collect();
        all.sort_by_key(|info| info.key);
        all
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}
