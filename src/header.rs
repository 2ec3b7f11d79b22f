use std::io::Read;

use declio::{Decode, Encode, EncodedSize};
use modular_bitfield::bitfield;
use modular_bitfield::prelude::*;

use crate::constants;
use crate::impl_bitfield_codecs;
use crate::result::{Error, Result};
use crate::segment::{SegmentChain, SegmentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signature {
    Wdbc,
    Wdb2,
    Wdb5,
    Wdc1,
}

impl Signature {
    pub fn from_magic(magic: [u8; 4]) -> Result<Self> {
        match magic {
            constants::SIG_WDBC => Ok(Signature::Wdbc),
            constants::SIG_WDB2 => Ok(Signature::Wdb2),
            constants::SIG_WDB5 => Ok(Signature::Wdb5),
            constants::SIG_WDC1 => Ok(Signature::Wdc1),
            other => Err(Error::UnsupportedSignature(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Encode, Decode)]
#[declio(ctx_is = "constants::ENDIANESS")]
pub(crate) struct WdbcHeader {
    pub record_count: u32,
    pub field_count: u32,
    pub record_size: u32,
    pub string_block_size: u32,
}

#[derive(Debug, Clone, Copy, Encode, Decode)]
#[declio(ctx_is = "constants::ENDIANESS")]
pub(crate) struct Wdb2Header {
    pub record_count: u32,
    pub field_count: u32,
    pub record_size: u32,
    pub string_block_size: u32,
    pub table_hash: u32,
    pub build: u32,
    pub timestamp_last_written: u32,
    pub min_id: u32,
    pub max_id: u32,
    pub locale: u32,
    pub copy_table_size: u32,
}

#[bitfield(bits = 32)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct Wdb5Flags {
    pub has_offset_map: bool,
    pub has_index_table: bool,
    #[skip]
    padding: B30,
}

impl_bitfield_codecs!(Wdb5Flags);

#[derive(Debug, Clone, Copy, Encode, Decode)]
#[declio(ctx_is = "constants::ENDIANESS")]
pub(crate) struct Wdb5Header {
    pub record_count: u32,
    pub field_count: u32,
    pub record_size: u32,
    pub string_block_size: u32,
    pub table_hash: u32,
    pub layout_hash: u32,
    pub min_id: u32,
    pub max_id: u32,
    pub locale: u32,
    pub copy_table_size: u32,
    pub flags: Wdb5Flags,
    pub id_index: u32,
}

#[derive(Debug, Clone, Copy, Encode, Decode)]
#[declio(ctx_is = "constants::ENDIANESS")]
pub(crate) struct Wdc1Header {
    pub record_count: u32,
    pub field_count: u32,
    pub record_size: u32,
    pub string_block_size: u32,
    pub table_hash: u32,
    pub layout_hash: u32,
    pub min_id: u32,
    pub max_id: u32,
    pub locale: u32,
    pub copy_table_size: u32,
    pub flags: Wdb5Flags,
    pub id_index: u32,
    pub total_field_count: u32,
    pub pallet_data_size: u32,
    pub common_data_size: u32,
    pub relationship_data_size: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum VersionHeader {
    Wdbc(WdbcHeader),
    Wdb2(Wdb2Header),
    Wdb5(Wdb5Header),
    Wdc1(Wdc1Header),
}

/// Fields every version exposes one way or another, normalized so the rest
/// of the crate never needs to match on `VersionHeader` itself.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderInfo {
    pub record_count: u32,
    pub field_count: u32,
    pub record_size: u32,
    pub string_block_size: u32,
    pub min_id: u32,
    pub max_id: u32,
    pub copy_table_size: u32,
    pub has_offset_map: bool,
    pub has_index_table: bool,
    pub total_field_count: u32,
    pub pallet_data_size: u32,
    pub common_data_size: u32,
    pub relationship_data_size: u32,
}

impl VersionHeader {
    pub fn info(&self) -> HeaderInfo {
        match self {
            VersionHeader::Wdbc(h) => HeaderInfo {
                record_count: h.record_count,
                field_count: h.field_count,
                record_size: h.record_size,
                string_block_size: h.string_block_size,
                min_id: 0,
                max_id: 0,
                copy_table_size: 0,
                has_offset_map: false,
                has_index_table: false,
                total_field_count: h.field_count,
                pallet_data_size: 0,
                common_data_size: 0,
                relationship_data_size: 0,
            },
            VersionHeader::Wdb2(h) => HeaderInfo {
                record_count: h.record_count,
                field_count: h.field_count,
                record_size: h.record_size,
                string_block_size: h.string_block_size,
                min_id: h.min_id,
                max_id: h.max_id,
                copy_table_size: h.copy_table_size,
                has_offset_map: false,
                has_index_table: false,
                total_field_count: h.field_count,
                pallet_data_size: 0,
                common_data_size: 0,
                relationship_data_size: 0,
            },
            VersionHeader::Wdb5(h) => HeaderInfo {
                record_count: h.record_count,
                field_count: h.field_count,
                record_size: h.record_size,
                string_block_size: h.string_block_size,
                min_id: h.min_id,
                max_id: h.max_id,
                copy_table_size: h.copy_table_size,
                has_offset_map: h.flags.has_offset_map(),
                has_index_table: h.flags.has_index_table(),
                total_field_count: h.field_count,
                pallet_data_size: 0,
                common_data_size: 0,
                relationship_data_size: 0,
            },
            VersionHeader::Wdc1(h) => HeaderInfo {
                record_count: h.record_count,
                field_count: h.field_count,
                record_size: h.record_size,
                string_block_size: h.string_block_size,
                min_id: h.min_id,
                max_id: h.max_id,
                copy_table_size: h.copy_table_size,
                has_offset_map: h.flags.has_offset_map(),
                has_index_table: h.flags.has_index_table(),
                total_field_count: h.total_field_count,
                pallet_data_size: h.pallet_data_size,
                common_data_size: h.common_data_size,
                relationship_data_size: h.relationship_data_size,
            },
        }
    }
}

pub(crate) fn read_header<R: Read>(reader: &mut R) -> Result<(Signature, VersionHeader)> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(|_| Error::Truncated(0))?;
    let sig = Signature::from_magic(magic)?;
    let header = match sig {
        Signature::Wdbc => VersionHeader::Wdbc(WdbcHeader::decode(constants::ENDIANESS, reader)?),
        Signature::Wdb2 => VersionHeader::Wdb2(Wdb2Header::decode(constants::ENDIANESS, reader)?),
        Signature::Wdb5 => VersionHeader::Wdb5(Wdb5Header::decode(constants::ENDIANESS, reader)?),
        Signature::Wdc1 => VersionHeader::Wdc1(Wdc1Header::decode(constants::ENDIANESS, reader)?),
    };
    Ok((sig, header))
}

/// Lays out the segment chain for a freshly-read header, before any
/// optional segment is actually parsed. Lengths for `Records` and
/// `StringBlock` are always known up front; everything past them is
/// positioned once its own size is known to the caller.
pub(crate) fn build_segments(sig: Signature, info: &HeaderInfo) -> SegmentChain {
    let mut chain = SegmentChain::new();
    chain.push_back(SegmentId::Records, (info.record_count as u64) * (info.record_size as u64));
    chain.push_back(SegmentId::StringBlock, info.string_block_size as u64);
    match sig {
        Signature::Wdbc | Signature::Wdb2 => {}
        Signature::Wdb5 => {
            if info.has_offset_map {
                let entries = (info.max_id - info.min_id + 1) as u64;
                chain.push_back(SegmentId::OffsetMap, entries * 6);
            }
            if info.has_index_table {
                chain.push_back(SegmentId::IndexTable, info.record_count as u64 * 4);
            }
            chain.push_back(SegmentId::CopyTable, info.copy_table_size as u64);
            chain.push_back(SegmentId::FieldInfo, info.field_count as u64 * 4);
        }
        Signature::Wdc1 => {
            if info.has_offset_map {
                let entries = (info.max_id - info.min_id + 1) as u64;
                chain.push_back(SegmentId::OffsetMap, entries * 6);
            }
            if info.has_index_table {
                chain.push_back(SegmentId::IndexTable, info.record_count as u64 * 4);
            }
            chain.push_back(SegmentId::CopyTable, info.copy_table_size as u64);
            chain.push_back(SegmentId::FieldInfo, info.field_count as u64 * 4);
            chain.push_back(SegmentId::PalletData, info.pallet_data_size as u64);
            chain.push_back(SegmentId::CommonData, info.common_data_size as u64);
            chain.push_back(SegmentId::RelationshipData, info.relationship_data_size as u64);
            chain.push_back(SegmentId::ExtendedFieldInfo, info.total_field_count as u64 * 16);
        }
    }
    chain
}
