use std::io::Read;

use declio::Decode;

use crate::constants;
use crate::result::Result;

/// Per-id `(offset, length)` pairs used by WDB5+ to locate variable-length
/// records directly, instead of walking a fixed-stride record array.
#[derive(Debug, Clone)]
pub(crate) struct OffsetMapRegion {
    entries: Vec<(u32, u16)>,
}

impl OffsetMapRegion {
    pub fn read<R: Read>(reader: &mut R, min_id: u32, max_id: u32) -> Result<Self> {
        let count = (max_id - min_id + 1) as usize;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = u32::decode(constants::ENDIANESS, reader)?;
            let length = u16::decode(constants::ENDIANESS, reader)?;
            entries.push((offset, length));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, slot: usize) -> Option<(u32, u16)> {
        self.entries.get(slot).copied()
    }
}
