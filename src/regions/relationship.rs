use std::collections::HashMap;
use std::io::Read;

use declio::Decode;

use crate::constants;
use crate::result::{Error, Result};

/// Foreign-key lookup table: for each record (addressed by its position in
/// the record array) an optional `u32` value pointing into another table.
/// Not every record needs to be present; a lookup for one that is not
/// yields a clear error rather than a fabricated zero.
#[derive(Debug, Clone)]
pub(crate) struct RelationshipRegion {
    by_record_index: HashMap<u32, u32>,
}

impl RelationshipRegion {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let num_entries = u32::decode(constants::ENDIANESS, reader)?;
        let _min_id = u32::decode(constants::ENDIANESS, reader)?;
        let _max_id = u32::decode(constants::ENDIANESS, reader)?;
        let mut by_record_index = HashMap::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            let foreign_id = u32::decode(constants::ENDIANESS, reader)?;
            let record_index = u32::decode(constants::ENDIANESS, reader)?;
            by_record_index.insert(record_index, foreign_id);
        }
        Ok(Self { by_record_index })
    }

    pub fn get(&self, record_index: u32) -> Result<u32> {
        self.by_record_index
            .get(&record_index)
            .copied()
            .ok_or(Error::UnsupportedLayout("record has no relationship-table entry"))
    }
}
