use std::collections::HashMap;
use std::io::Read;

use crate::result::{Error, Result};
use crate::schema::ElementType;
use crate::value::FieldValue;

/// One field's pool of shared cell values. A plain palette column's raw
/// bit-packed index selects one cell directly; a palette-array column's
/// index instead selects the first of `cardinality` consecutive cells
/// making up that row's array (the single-column disambiguation this
/// reader applies to palette arrays).
#[derive(Debug, Clone)]
pub(crate) struct PaletteField {
    cells: Vec<[u8; 4]>,
    cardinality: u32,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PaletteRegion {
    fields: HashMap<u32, PaletteField>,
}

impl PaletteRegion {
    pub fn read_field<R: Read>(reader: &mut R, byte_len: u64, cardinality: u32) -> Result<PaletteField> {
        let count = byte_len / 4;
        let mut cells = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut raw = [0u8; 4];
            reader.read_exact(&mut raw)?;
            cells.push(raw);
        }
        Ok(PaletteField { cells, cardinality: cardinality.max(1) })
    }

    pub fn insert_field(&mut self, field_index: u32, field: PaletteField) {
        self.fields.insert(field_index, field);
    }

    fn field(&self, field_index: u32) -> Result<&PaletteField> {
        self.fields
            .get(&field_index)
            .ok_or(Error::UnsupportedLayout("column has no pallet-data pool"))
    }

    pub fn get(&self, ty: ElementType, field_index: u32, raw_index: u32) -> Result<FieldValue> {
        let field = self.field(field_index)?;
        let cell = field
            .cells
            .get(raw_index as usize)
            .ok_or(Error::Truncated(raw_index as u64))?;
        FieldValue::from_le_bytes(ty, cell)
    }

    pub fn get_array(&self, ty: ElementType, field_index: u32, raw_index: u32, slot: u32) -> Result<FieldValue> {
        let field = self.field(field_index)?;
        let base = raw_index as u64 * field.cardinality as u64;
        let cell = field
            .cells
            .get((base + slot as u64) as usize)
            .ok_or(Error::Truncated(base + slot as u64))?;
        FieldValue::from_le_bytes(ty, cell)
    }
}
