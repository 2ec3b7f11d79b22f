use std::io::Cursor;

use assert_matches::assert_matches;
use dbcfile::{DbcFile, DbcElementType as ElementType, DbcError as Error, DbcResult as Result, Record, Schema, SchemaBuilder, FieldValue};

#[derive(Debug, Default, Clone)]
struct Monster {
    id: u32,
    health: u32,
    name: String,
}

impl Record for Monster {
    fn schema() -> Schema {
        SchemaBuilder::new()
            .index("id", ElementType::U32)
            .field("health", ElementType::U32)
            .field("name", ElementType::String)
            .build()
    }

    fn field(&self, member: usize, _slot: u32) -> FieldValue {
        match member {
            0 => FieldValue::U32(self.id),
            1 => FieldValue::U32(self.health),
            2 => FieldValue::String(self.name.clone()),
            _ => unreachable!("Monster has only 3 members"),
        }
    }

    fn assign(&mut self, member: usize, _slot: u32, value: FieldValue) {
        match (member, value) {
            (0, FieldValue::U32(v)) => self.id = v,
            (1, FieldValue::U32(v)) => self.health = v,
            (2, FieldValue::String(v)) => self.name = v,
            _ => {}
        }
    }
}

fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Builds a minimal WDBC file: magic, 4 header words, a fixed-stride
/// record array, then a null-terminated string block.
fn build_wdbc() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"WDBC");
    write_u32(&mut buf, 2); // record_count
    write_u32(&mut buf, 3); // field_count
    write_u32(&mut buf, 12); // record_size (3 x u32)
    write_u32(&mut buf, 5); // string_block_size

    write_u32(&mut buf, 1001); // record 0: id
    write_u32(&mut buf, 100); // health
    write_u32(&mut buf, 0); // name -> ""

    write_u32(&mut buf, 1002); // record 1: id
    write_u32(&mut buf, 200); // health
    write_u32(&mut buf, 1); // name -> "foo"

    buf.extend_from_slice(&[0, b'f', b'o', b'o', 0]);
    buf
}

#[test]
fn wdbc_decodes_plain_and_string_columns() -> Result<()> {
    let file = DbcFile::open(Cursor::new(build_wdbc()))?;
    let records: Vec<Monster> = file.records::<Monster>()?.collect::<Result<_>>()?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 1001);
    assert_eq!(records[0].health, 100);
    assert_eq!(records[0].name, "");
    assert_eq!(records[1].id, 1002);
    assert_eq!(records[1].health, 200);
    assert_eq!(records[1].name, "foo");
    Ok(())
}

#[test]
fn driver_exposes_header_and_key_accessors() -> Result<()> {
    let file = DbcFile::open(Cursor::new(build_wdbc()))?;
    assert_eq!(file.record_count(), 2);

    let mut records: Vec<Monster> = file.records::<Monster>()?.collect::<Result<_>>()?;
    let first = &mut records[0];
    assert_eq!(file.key_of(first)?, 1001);

    file.set_key(first, 9001)?;
    assert_eq!(first.id, 9001);
    assert_eq!(file.key_of(first)?, 9001);

    let copy = file.clone(first);
    assert_eq!(copy.id, first.id);
    assert_eq!(copy.health, first.health);
    assert_eq!(copy.name, first.name);
    Ok(())
}

#[test]
fn truncated_record_array_is_an_error() {
    let mut bytes = build_wdbc();
    bytes.truncate(bytes.len() - 10);
    let result = DbcFile::open(Cursor::new(bytes));
    assert_matches!(result, Err(Error::Truncated(_)));
}

#[derive(Debug, Default, Clone)]
struct Packed {
    flag: bool,
    value: u16,
}

impl Record for Packed {
    fn schema() -> Schema {
        SchemaBuilder::new()
            .field("flag", ElementType::Bool)
            .field("value", ElementType::U16)
            .build()
    }

    fn field(&self, member: usize, _slot: u32) -> FieldValue {
        match member {
            0 => FieldValue::Bool(self.flag),
            1 => FieldValue::U16(self.value),
            _ => unreachable!("Packed has only 2 members"),
        }
    }

    fn assign(&mut self, member: usize, _slot: u32, value: FieldValue) {
        match (member, value) {
            (0, FieldValue::Bool(v)) => self.flag = v,
            (1, FieldValue::U16(v)) => self.value = v,
            _ => {}
        }
    }
}

fn write_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Builds a minimal WDB5 file with one record whose two fields are packed
/// into the same two bytes (a 1-bit flag followed by a 15-bit value),
/// exercising the bit cursor crossing a byte boundary.
fn build_wdb5_bitpacked() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"WDB5");
    write_u32(&mut buf, 1); // record_count
    write_u32(&mut buf, 2); // field_count
    write_u32(&mut buf, 2); // record_size (bytes)
    write_u32(&mut buf, 1); // string_block_size
    write_u32(&mut buf, 0); // table_hash
    write_u32(&mut buf, 0); // layout_hash
    write_u32(&mut buf, 0); // min_id
    write_u32(&mut buf, 0); // max_id
    write_u32(&mut buf, 0); // locale
    write_u32(&mut buf, 0); // copy_table_size
    write_u32(&mut buf, 0); // flags: no offset map, no index table
    write_u32(&mut buf, 0); // id_index

    // record: flag=1 (bit 0), value=12345 (bits 1..16)
    let packed: u16 = (12345u16 << 1) | 1;
    write_u16(&mut buf, packed);

    buf.push(0); // string block: just the empty string

    // field info: (offset_bits, size_bits) per column; width is stored
    // inverted as `32 - size_bits`, so a 1-bit field stores 31 and a
    // 15-bit field stores 17.
    write_u16(&mut buf, 0);
    write_u16(&mut buf, 31);
    write_u16(&mut buf, 1);
    write_u16(&mut buf, 17);
    buf
}

#[test]
fn wdb5_reads_bit_packed_columns_across_a_byte_boundary() -> Result<()> {
    let file = DbcFile::open(Cursor::new(build_wdb5_bitpacked()))?;
    let records: Vec<Packed> = file.records::<Packed>()?.collect::<Result<_>>()?;

    assert_eq!(records.len(), 1);
    assert!(records[0].flag);
    assert_eq!(records[0].value, 12345);
    Ok(())
}

#[derive(Debug, Default, Clone)]
struct Critter {
    id: u32,
    hp: u32,
}

impl Record for Critter {
    fn schema() -> Schema {
        SchemaBuilder::new()
            .index("id", ElementType::U32)
            .field("hp", ElementType::U32)
            .build()
    }

    fn field(&self, member: usize, _slot: u32) -> FieldValue {
        match member {
            0 => FieldValue::U32(self.id),
            1 => FieldValue::U32(self.hp),
            _ => unreachable!("Critter has only 2 members"),
        }
    }

    fn assign(&mut self, member: usize, _slot: u32, value: FieldValue) {
        match (member, value) {
            (0, FieldValue::U32(v)) => self.id = v,
            (1, FieldValue::U32(v)) => self.hp = v,
            _ => {}
        }
    }
}

/// WDB5 file with no offset map/index table (so the primary set is
/// addressed by slot position, and the id column is decoded inline from
/// the record bytes rather than from an external table) and a one-pair
/// copy table, exercising that the copy-table key gets overwritten even
/// though the source record's own id column is read in-line.
fn build_wdb5_inline_id_with_copy() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"WDB5");
    write_u32(&mut buf, 2); // record_count
    write_u32(&mut buf, 2); // field_count
    write_u32(&mut buf, 8); // record_size
    write_u32(&mut buf, 1); // string_block_size
    write_u32(&mut buf, 0); // table_hash
    write_u32(&mut buf, 0); // layout_hash
    write_u32(&mut buf, 0); // min_id
    write_u32(&mut buf, 0); // max_id
    write_u32(&mut buf, 0); // locale
    write_u32(&mut buf, 8); // copy_table_size: one (dst, src) pair
    write_u32(&mut buf, 0); // flags: no offset map, no index table
    write_u32(&mut buf, 0); // id_index

    write_u32(&mut buf, 5); // record at slot 0: inline id (irrelevant to lookup)
    write_u32(&mut buf, 100); // hp

    write_u32(&mut buf, 1); // record at slot 1: inline id
    write_u32(&mut buf, 7); // hp

    buf.push(0); // string block

    write_u32(&mut buf, 3); // copy table: dst_id
    write_u32(&mut buf, 1); // copy table: src slot (record at slot 1)

    // field info: both columns full-width (size_bits 0 -> width 32)
    write_u16(&mut buf, 0);
    write_u16(&mut buf, 0);
    write_u16(&mut buf, 32);
    write_u16(&mut buf, 0);
    buf
}

#[test]
fn copy_table_overwrites_inline_key() -> Result<()> {
    let file = DbcFile::open(Cursor::new(build_wdb5_inline_id_with_copy()))?;
    let copies: Vec<Critter> = file.copy_records::<Critter>()?;

    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].id, 3);
    assert_eq!(copies[0].hp, 7);
    Ok(())
}

#[test]
fn unsupported_signature_is_rejected() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"XXXX");
    bytes.extend_from_slice(&[0u8; 16]);
    let result = DbcFile::open(Cursor::new(bytes));
    assert_matches!(result, Err(Error::UnsupportedSignature(_)));
}
