use std::io::Read;

use declio::{Decode, Encode};

use crate::constants;
use crate::result::{Error, Result};

/// How a column's value is actually stored, beyond its raw bit position.
/// WDBC/WDB2/WDB5-without-extended-info only ever use `None`/`Immediate`;
/// WDC1's extended field info can select any of the five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CompressionKind {
    None,
    Immediate,
    CommonData,
    Palette,
    PaletteArray,
}

impl CompressionKind {
    fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(CompressionKind::None),
            1 => Ok(CompressionKind::Immediate),
            2 => Ok(CompressionKind::CommonData),
            3 => Ok(CompressionKind::Palette),
            4 => Ok(CompressionKind::PaletteArray),
            _ => Err(Error::UnsupportedLayout("unknown column compression kind")),
        }
    }
}

/// Fully resolved per-column layout, used uniformly by the deserializer
/// regardless of which version produced it (WDBC/WDB2 synthesize this
/// directly from the schema; WDB5/WDC1 parse it from FieldInfo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FieldMetadata {
    pub bit_offset: u32,
    pub bit_width: u32,
    pub compression: CompressionKind,
    pub additional_data_size: u32,
    pub array_count: u32,
    /// Raw default cell for `CommonData` columns, type-punned the same way
    /// an absent row's value is; `[0; 4]` for every other compression kind.
    pub default: [u8; 4],
}

#[derive(Debug, Clone, Copy, Encode, Decode)]
#[declio(ctx_is = "constants::ENDIANESS")]
pub(crate) struct RawFieldInfoEntry {
    pub field_offset_bits: u16,
    pub field_size_bits: u16,
}

#[derive(Debug, Clone, Copy, Encode, Decode)]
#[declio(ctx_is = "constants::ENDIANESS")]
pub(crate) struct RawExtendedFieldInfo {
    pub compression_type: u32,
    pub val1: u32,
    pub val2: u32,
    pub val3: u32,
}

pub(crate) fn parse_field_info<R: Read>(reader: &mut R, field_count: u32) -> Result<Vec<RawFieldInfoEntry>> {
    let mut out = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        out.push(RawFieldInfoEntry::decode(constants::ENDIANESS, reader)?);
    }
    Ok(out)
}

pub(crate) fn parse_extended_field_info<R: Read>(reader: &mut R, field_count: u32) -> Result<Vec<RawExtendedFieldInfo>> {
    let mut out = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        out.push(RawExtendedFieldInfo::decode(constants::ENDIANESS, reader)?);
    }
    Ok(out)
}

/// Resolves a WDB5-style field-info entry, with no extended info, into
/// `None`/`Immediate` metadata (every cell lives inline in the record).
/// Widths are stored inverted: `size_in_bits = 32 - field_size_bits`.
pub(crate) fn from_basic(entries: &[RawFieldInfoEntry]) -> Vec<FieldMetadata> {
    entries
        .iter()
        .map(|e| FieldMetadata {
            bit_offset: e.field_offset_bits as u32,
            bit_width: 32u32.saturating_sub(e.field_size_bits as u32),
            compression: CompressionKind::Immediate,
            additional_data_size: 0,
            array_count: 1,
            default: [0; 4],
        })
        .collect()
}

/// Resolves WDC1-style combined base + extended field info into final
/// per-column metadata; `val1`/`val2`/`val3` are interpreted per
/// compression kind (palette array count, common-data default, etc).
pub(crate) fn apply_extended_field_info(
    base: &[RawFieldInfoEntry],
    extended: &[RawExtendedFieldInfo],
) -> Result<Vec<FieldMetadata>> {
    if base.len() != extended.len() {
        return Err(Error::SchemaArityMismatch {
            schema_len: extended.len(),
            file_len: base.len(),
        });
    }
    base.iter()
        .zip(extended.iter())
        .map(|(b, e)| {
            let compression = CompressionKind::from_raw(e.compression_type)?;
            let array_count = match compression {
                CompressionKind::PaletteArray => e.val1.max(1),
                _ => 1,
            };
            let default = match compression {
                CompressionKind::CommonData => e.val3.to_le_bytes(),
                _ => [0; 4],
            };
            Ok(FieldMetadata {
                bit_offset: b.field_offset_bits as u32,
                bit_width: b.field_size_bits as u32,
                compression,
                additional_data_size: e.val2,
                array_count,
                default,
            })
        })
        .collect()
}
