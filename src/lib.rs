use std::io::{self, Read, Seek, SeekFrom};
use std::marker::PhantomData;

use crate::header::{build_segments, read_header, Signature, VersionHeader};
use crate::key::key_accessor;
use crate::options::{OpenOptions, SegmentMask};
use crate::record::{RecordCursor, RecordReader};
use crate::record_trait::DbcRecord;
use crate::regions::common_data::CommonDataRegion;
use crate::regions::copy_table::CopyTableRegion;
use crate::regions::field_info::{self, CompressionKind, FieldMetadata};
use crate::regions::index_table::IndexTableRegion;
use crate::regions::offset_map::OffsetMapRegion;
use crate::regions::palette::PaletteRegion;
use crate::regions::relationship::RelationshipRegion;
use crate::regions::string_block::StringBlockRegion;
use crate::result::{Error, Result};
use crate::schema::Member;
use crate::segment::{SegmentChain, SegmentId};

mod codecs;
pub mod constants;
pub mod deserializer;
pub mod header;
mod key;
pub mod options;
pub mod record;
pub mod record_trait;
mod regions;
pub mod result;
pub mod schema;
mod segment;
mod utils;
pub mod value;

pub use options::{OpenOptions as DbcFileOptions, SegmentMask as DbcSegmentMask};
pub use record_trait::DbcRecord as Record;
pub use result::{Error as DbcError, Result as DbcResult};
pub use schema::{ElementType as DbcElementType, Member as DbcMember, MemberKind, Schema, SchemaBuilder};
pub use value::FieldValue;

#[derive(Debug, Clone, Copy)]
struct RecordLocation {
    id: u32,
    offset: usize,
    length: usize,
}

/// A reader for a single WDBC/WDB2/WDB5/WDC1 table file. Segment layout and
/// which optional regions are present are resolved once at open time;
/// decoding into a concrete record type happens lazily, one `records::<T>()`
/// call at a time.
#[derive(Debug)]
pub struct DbcFile<R> {
    inner: R,
    sig: Signature,
    header: VersionHeader,
    opts: OpenOptions,
    /// Absolute byte position right after the header, from which every
    /// segment offset in `segments` is measured.
    data_start: u64,
    segments: SegmentChain,
    record_count: u32,
    record_size: u32,
    min_id: u32,
    records_bytes: Vec<u8>,
    strings: StringBlockRegion,
    offset_map: Option<OffsetMapRegion>,
    index_table: Option<IndexTableRegion>,
    copy_table: Option<CopyTableRegion>,
    palette: Option<PaletteRegion>,
    common: Option<CommonDataRegion>,
    relationship: Option<RelationshipRegion>,
    /// `Some` for WDB5/WDC1, which carry per-file column metadata. `None`
    /// for WDBC/WDB2, whose columns are synthesized from a schema at
    /// `records::<T>()` time instead.
    columns: Option<Vec<FieldMetadata>>,
}

impl<R> DbcFile<R>
where
    R: Read + Seek,
{
    pub fn open(reader: R) -> Result<Self> {
        Self::open_with_options(reader, OpenOptions::default())
    }

    pub fn open_with_options(mut reader: R, opts: OpenOptions) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let (sig, header) = read_header(&mut reader)?;
        let info = header.info();
        let segments = build_segments(sig, &info);
        let data_start = reader.stream_position()?;

        let mut file = DbcFile {
            inner: reader,
            sig,
            header,
            opts,
            data_start,
            segments,
            record_count: info.record_count,
            record_size: info.record_size,
            min_id: info.min_id,
            records_bytes: Vec::new(),
            strings: StringBlockRegion::new(Vec::new()),
            offset_map: None,
            index_table: None,
            copy_table: None,
            palette: None,
            common: None,
            relationship: None,
            columns: None,
        };
        file.load_segments(&info)?;
        Ok(file)
    }

    /// The raw, version-specific header this file was opened with.
    pub fn header(&self) -> &VersionHeader {
        &self.header
    }

    /// Number of primary records the header declares.
    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    /// Reads `record`'s key member. Fails if `T`'s schema declares no index
    /// member, or declares one whose type isn't `i32`/`u32`.
    pub fn key_of<T: DbcRecord + 'static>(&self, record: &T) -> Result<u32> {
        Ok(key_accessor::<T>()?.get(record))
    }

    /// Overwrites `record`'s key member in place.
    pub fn set_key<T: DbcRecord + 'static>(&self, record: &mut T, key: u32) -> Result<()> {
        key_accessor::<T>()?.set(record, key);
        Ok(())
    }

    /// Clones a decoded record.
    pub fn clone<T: DbcRecord>(&self, record: &T) -> T {
        record.clone()
    }

    fn read_segment(&mut self, id: SegmentId) -> Result<Vec<u8>> {
        let offset = self
            .segments
            .offset_of(id)
            .ok_or(Error::MissingSegment(id))?;
        let length = self.segments.length_of(id).unwrap_or(0);
        self.inner.seek(SeekFrom::Start(self.data_start + offset))?;
        let mut buf = vec![0u8; length as usize];
        self.inner.read_exact(&mut buf).map_err(|_| Error::Truncated(offset))?;
        Ok(buf)
    }

    fn load_segments(&mut self, info: &header::HeaderInfo) -> Result<()> {
        self.records_bytes = self.read_segment(SegmentId::Records)?;
        self.strings = StringBlockRegion::new(self.read_segment(SegmentId::StringBlock)?);

        let mask = self.opts.load_mask;

        if info.has_offset_map && mask.contains(SegmentMask::OFFSET_MAP) && self.segments.is_present(SegmentId::OffsetMap) {
            let bytes = self.read_segment(SegmentId::OffsetMap)?;
            let mut cursor = io::Cursor::new(bytes);
            self.offset_map = Some(OffsetMapRegion::read(&mut cursor, info.min_id, info.max_id)?);
        }

        if info.has_index_table && mask.contains(SegmentMask::INDEX_TABLE) && self.segments.is_present(SegmentId::IndexTable) {
            let bytes = self.read_segment(SegmentId::IndexTable)?;
            let mut cursor = io::Cursor::new(bytes);
            self.index_table = Some(IndexTableRegion::read(&mut cursor, info.record_count)?);
        }

        if mask.contains(SegmentMask::COPY_TABLE) && self.segments.is_present(SegmentId::CopyTable) && info.copy_table_size > 0 {
            let bytes = self.read_segment(SegmentId::CopyTable)?;
            let mut cursor = io::Cursor::new(bytes);
            self.copy_table = Some(CopyTableRegion::read(&mut cursor, info.copy_table_size as u64)?);
        }

        match self.sig {
            Signature::Wdbc | Signature::Wdb2 => {}
            Signature::Wdb5 => {
                let bytes = self.read_segment(SegmentId::FieldInfo)?;
                let mut cursor = io::Cursor::new(bytes);
                let entries = field_info::parse_field_info(&mut cursor, info.field_count)?;
                self.columns = Some(field_info::from_basic(&entries));
            }
            Signature::Wdc1 => {
                let base_bytes = self.read_segment(SegmentId::FieldInfo)?;
                let mut base_cursor = io::Cursor::new(base_bytes);
                let base = field_info::parse_field_info(&mut base_cursor, info.field_count)?;

                let ext_bytes = self.read_segment(SegmentId::ExtendedFieldInfo)?;
                let mut ext_cursor = io::Cursor::new(ext_bytes);
                let extended = field_info::parse_extended_field_info(&mut ext_cursor, info.total_field_count)?;
                let resolved = field_info::apply_extended_field_info(&base, &extended)?;

                if mask.contains(SegmentMask::COMMON_DATA) && info.common_data_size > 0 {
                    let bytes = self.read_segment(SegmentId::CommonData)?;
                    let mut cursor = io::Cursor::new(bytes);
                    let mut common = CommonDataRegion::default();
                    for (i, col) in resolved.iter().enumerate() {
                        if col.compression == CompressionKind::CommonData {
                            let values = CommonDataRegion::read(&mut cursor, i as u32, col.additional_data_size)?;
                            common.insert_field(i as u32, values);
                        }
                    }
                    self.common = Some(common);
                }

                if mask.contains(SegmentMask::RELATIONSHIP_DATA) && info.relationship_data_size > 0 {
                    let bytes = self.read_segment(SegmentId::RelationshipData)?;
                    let mut cursor = io::Cursor::new(bytes);
                    self.relationship = Some(RelationshipRegion::read(&mut cursor)?);
                }

                if mask.contains(SegmentMask::COMMON_DATA) && info.pallet_data_size > 0 {
                    let bytes = self.read_segment(SegmentId::PalletData)?;
                    let mut cursor = io::Cursor::new(bytes);
                    let mut palette = PaletteRegion::default();
                    for (i, col) in resolved.iter().enumerate() {
                        match col.compression {
                            CompressionKind::Palette => {
                                let field = PaletteRegion::read_field(&mut cursor, col.additional_data_size as u64, 1)?;
                                palette.insert_field(i as u32, field);
                            }
                            CompressionKind::PaletteArray => {
                                let field =
                                    PaletteRegion::read_field(&mut cursor, col.additional_data_size as u64, col.array_count)?;
                                palette.insert_field(i as u32, field);
                            }
                            _ => {}
                        }
                    }
                    self.palette = Some(palette);
                }

                self.columns = Some(resolved);
            }
        }

        Ok(())
    }

    fn has_external_index(&self) -> bool {
        self.index_table.is_some() || self.offset_map.is_some()
    }

    /// Resolves the `(id, byte range)` of every primary record, in file
    /// order.
    fn primary_locations(&self) -> Result<Vec<RecordLocation>> {
        if let Some(table) = &self.index_table {
            let stride = self.record_size as usize;
            return Ok(table
                .ids()
                .iter()
                .enumerate()
                .map(|(slot, &id)| RecordLocation { id, offset: slot * stride, length: stride })
                .collect());
        }
        if let Some(map) = &self.offset_map {
            let mut out = Vec::with_capacity(map.len());
            for slot in 0..map.len() {
                let Some((offset, length)) = map.get(slot) else { continue };
                if length == 0 {
                    continue;
                }
                out.push(RecordLocation {
                    id: self.min_id + slot as u32,
                    offset: offset as usize,
                    length: length as usize,
                });
            }
            return Ok(out);
        }
        let stride = self.record_size as usize;
        Ok((0..self.record_count as usize)
            .map(|slot| RecordLocation { id: slot as u32, offset: slot * stride, length: stride })
            .collect())
    }

    fn location_of_id(&self, id: u32) -> Option<RecordLocation> {
        if let Some(table) = &self.index_table {
            let slot = table.slot_of(id)?;
            let stride = self.record_size as usize;
            return Some(RecordLocation { id, offset: slot * stride, length: stride });
        }
        if let Some(map) = &self.offset_map {
            let slot = id.checked_sub(self.min_id)? as usize;
            let (offset, length) = map.get(slot)?;
            if length == 0 {
                return None;
            }
            return Some(RecordLocation { id, offset: offset as usize, length: length as usize });
        }
        // No external id source: the primary set is sequential and the id
        // is the slot itself, same as `primary_locations`'s fallback branch.
        let stride = self.record_size as usize;
        if (id as usize) < self.record_count as usize {
            Some(RecordLocation { id, offset: id as usize * stride, length: stride })
        } else {
            None
        }
    }

    fn record_reader<'a>(&'a self, location: &RecordLocation, id: u32) -> RecordReader<'a> {
        let bytes = &self.records_bytes[location.offset..location.offset + location.length];
        RecordReader {
            cursor: RecordCursor::new(bytes),
            strings: Some(&self.strings),
            palette: self.palette.as_ref(),
            common: self.common.as_ref(),
            relationship: self.relationship.as_ref(),
            record_index: id,
        }
    }

    fn decode_at<T: DbcRecord + 'static>(
        &self,
        plan: &deserializer::Plan,
        location: RecordLocation,
    ) -> Result<T> {
        let mut reader = self.record_reader(&location, location.id);
        let mut record = T::default();
        deserializer::execute_plan(plan, &mut reader, location.id, &mut record)?;
        Ok(record)
    }

    /// Iterates every primary record of type `T` in file order.
    pub fn records<T: DbcRecord + 'static>(&self) -> Result<RecordIter<'_, R, T>> {
        let schema = T::schema();
        let members = schema.effective_members(&self.opts);
        let has_external_index = self.has_external_index();
        let columns = match &self.columns {
            Some(c) => c.clone(),
            None => synthesize_columns_from_schema(&members, has_external_index),
        };
        let plan = deserializer::cached_plan::<T>(&members, &columns, self.relationship.is_some(), has_external_index)?;
        let locations = self.primary_locations()?;
        Ok(RecordIter {
            file: self,
            plan,
            locations: locations.into_iter(),
            _marker: PhantomData,
        })
    }

    /// Iterates every record produced via the copy table: each materializes
    /// the bytes stored under its `src_id` with `dst_id` substituted into
    /// the index member.
    pub fn copy_records<T: DbcRecord + 'static>(&self) -> Result<Vec<T>> {
        let Some(copy_table) = &self.copy_table else {
            return Ok(Vec::new());
        };
        let schema = T::schema();
        let members = schema.effective_members(&self.opts);
        let has_external_index = self.has_external_index();
        let columns = match &self.columns {
            Some(c) => c.clone(),
            None => synthesize_columns_from_schema(&members, has_external_index),
        };
        let plan = deserializer::cached_plan::<T>(&members, &columns, self.relationship.is_some(), has_external_index)?;
        let mut out = Vec::with_capacity(copy_table.pairs().len());
        for &(dst_id, src_id) in copy_table.pairs() {
            let mut location = self
                .location_of_id(src_id)
                .ok_or(Error::UnsupportedLayout("copy table references an id outside the primary record set"))?;
            location.id = dst_id;
            let mut record = self.decode_at::<T>(&plan, location)?;
            self.set_key(&mut record, dst_id)?;
            out.push(record);
        }
        Ok(out)
    }

    /// Convenience: primary records followed by copy-table records, unless
    /// `OpenOptions::copy_to_list` is false.
    pub fn all_records<T: DbcRecord + 'static>(&self) -> Result<Vec<T>> {
        let mut out: Vec<T> = self.records::<T>()?.collect::<Result<_>>()?;
        if self.opts.copy_to_list {
            out.extend(self.copy_records::<T>()?);
        }
        Ok(out)
    }
}

fn synthesize_columns_from_schema(members: &[(usize, &Member)], has_external_index: bool) -> Vec<FieldMetadata> {
    let mut offset = 0u32;
    let mut columns = Vec::new();
    for (_, member) in members {
        if member.is_foreign_key {
            continue;
        }
        if member.is_index && has_external_index {
            continue;
        }
        let width = member.ty.bit_width().unwrap_or(32);
        for _ in 0..member.cardinality {
            columns.push(FieldMetadata {
                bit_offset: offset,
                bit_width: width,
                compression: CompressionKind::Immediate,
                additional_data_size: 0,
                array_count: 1,
                default: [0; 4],
            });
            offset += width;
        }
    }
    columns
}

/// Lazily decodes each primary record as it's pulled; a decode error stops
/// iteration rather than silently skipping the remaining records.
pub struct RecordIter<'f, R, T> {
    file: &'f DbcFile<R>,
    plan: std::sync::Arc<deserializer::Plan>,
    locations: std::vec::IntoIter<RecordLocation>,
    _marker: PhantomData<T>,
}

impl<'f, R, T> Iterator for RecordIter<'f, R, T>
where
    R: Read + Seek,
    T: DbcRecord + 'static,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let location = self.locations.next()?;
        Some(self.file.decode_at::<T>(&self.plan, location))
    }
}
