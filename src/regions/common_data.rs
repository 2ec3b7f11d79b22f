use std::collections::HashMap;
use std::io::Read;

use declio::Decode;

use crate::constants;
use crate::result::Result;
use crate::schema::ElementType;
use crate::value::FieldValue;

/// Sparse per-record overrides for a "common data" column: most records
/// take the column's default value and only the ones present here differ.
#[derive(Debug, Clone, Default)]
pub(crate) struct CommonDataRegion {
    by_field: HashMap<u32, HashMap<u32, [u8; 4]>>,
}

impl CommonDataRegion {
    pub fn read<R: Read>(reader: &mut R, field_index: u32, num_values: u32) -> Result<HashMap<u32, [u8; 4]>> {
        let mut values = HashMap::with_capacity(num_values as usize);
        for _ in 0..num_values {
            let record_id = u32::decode(constants::ENDIANESS, reader)?;
            let mut raw = [0u8; 4];
            reader.read_exact(&mut raw)?;
            values.insert(record_id, raw);
        }
        let _ = field_index;
        Ok(values)
    }

    pub fn insert_field(&mut self, field_index: u32, values: HashMap<u32, [u8; 4]>) {
        self.by_field.insert(field_index, values);
    }

    pub fn get(&self, field_index: u32, record_id: u32, ty: ElementType, default: &[u8]) -> Result<FieldValue> {
        match self.by_field.get(&field_index).and_then(|m| m.get(&record_id)) {
            Some(raw) => FieldValue::from_le_bytes(ty, raw),
            None => FieldValue::from_le_bytes(ty, default),
        }
    }
}
