use std::io::Read;

use declio::Decode;

use crate::constants;
use crate::result::Result;

/// `(dst_id, src_id)` pairs: a record whose id is `dst_id` is materialized
/// by decoding the bytes stored under `src_id` and substituting `dst_id`
/// into the index column in place of whatever id those bytes carry.
#[derive(Debug, Clone)]
pub(crate) struct CopyTableRegion {
    pairs: Vec<(u32, u32)>,
}

impl CopyTableRegion {
    pub fn read<R: Read>(reader: &mut R, byte_len: u64) -> Result<Self> {
        let count = byte_len / 8;
        let mut pairs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let dst_id = u32::decode(constants::ENDIANESS, reader)?;
            let src_id = u32::decode(constants::ENDIANESS, reader)?;
            pairs.push((dst_id, src_id));
        }
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }
}
