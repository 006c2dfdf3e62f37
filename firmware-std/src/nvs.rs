//! Knowledge persistence in the default NVS partition.

use airtally::storage::{BlobStore, StorageError};
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

const NAMESPACE: &str = "airtally";

/// Largest blob NVS accepts under one key (multi-page blobs).
const MAX_BLOB_LEN: usize = 64 * 1024;

pub struct NvsStore {
    nvs: EspNvs<NvsDefault>,
}

impl NvsStore {
    pub fn new(partition: EspDefaultNvsPartition) -> anyhow::Result<Self> {
        let nvs = EspNvs::new(partition, NAMESPACE, true)?;
        log::info!("NVS namespace '{}' open", NAMESPACE);
        Ok(Self { nvs })
    }
}

impl BlobStore for NvsStore {
    fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let len = match self.nvs.blob_len(name) {
            Ok(Some(len)) => len,
            Ok(None) => return Ok(None),
            Err(e) => {
                log::warn!("NVS blob_len({}) failed: {:?}", name, e);
                return Err(StorageError::Read);
            }
        };
        let mut buf = vec![0u8; len];
        match self.nvs.get_blob(name, &mut buf) {
            Ok(Some(data)) => Ok(Some(data.to_vec())),
            Ok(None) => Ok(None),
            Err(e) => {
                log::warn!("NVS get_blob({}) failed: {:?}", name, e);
                Err(StorageError::Read)
            }
        }
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > MAX_BLOB_LEN {
            return Err(StorageError::TooLarge);
        }
        self.nvs.set_blob(name, data).map_err(|e| {
            log::warn!("NVS set_blob({}) failed: {:?}", name, e);
            StorageError::Write
        })
    }
}
