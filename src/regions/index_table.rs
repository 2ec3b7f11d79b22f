use std::io::Read;

use declio::Decode;

use crate::constants;
use crate::result::Result;

/// Maps a record's physical slot (its position in the record array) to its
/// logical id, for versions that don't derive the id from a schema column.
#[derive(Debug, Clone)]
pub(crate) struct IndexTableRegion {
    ids: Vec<u32>,
}

impl IndexTableRegion {
    pub fn read<R: Read>(reader: &mut R, record_count: u32) -> Result<Self> {
        let mut ids = Vec::with_capacity(record_count as usize);
        for _ in 0..record_count {
            ids.push(u32::decode(constants::ENDIANESS, reader)?);
        }
        Ok(Self { ids })
    }

    pub fn id_at(&self, slot: usize) -> Option<u32> {
        self.ids.get(slot).copied()
    }

    pub fn slot_of(&self, id: u32) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }
}
