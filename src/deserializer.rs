use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

use crate::record::RecordReader;
use crate::record_trait::DbcRecord;
use crate::regions::field_info::{CompressionKind, FieldMetadata};
use crate::result::{Error, Result};
use crate::schema::ElementType;

#[derive(Debug, Clone, Copy)]
pub(crate) enum ScalarOp {
    Index,
    ForeignKey,
    Immediate { bit_offset: u32, bit_width: u32 },
    StringImmediate { bit_offset: u32 },
    Palette { field_index: u32, bit_offset: u32, bit_width: u32 },
    PaletteArray { field_index: u32, bit_offset: u32, bit_width: u32 },
    CommonData { field_index: u32, default: [u8; 4] },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PlanStep {
    pub member: usize,
    pub slot: u32,
    pub ty: ElementType,
    pub op: ScalarOp,
}

pub(crate) type Plan = Vec<PlanStep>;

/// Builds a linear walk over a record type's effective members against one
/// file's resolved column metadata. A palette-array member consumes a
/// single file column for its whole run (the chosen single-column
/// disambiguation for that compression kind); every other compression kind
/// produces one `PlanStep` per array slot.
pub(crate) fn build_plan(
    members: &[(usize, &crate::schema::Member)],
    columns: &[FieldMetadata],
    has_external_index: bool,
) -> Result<Plan> {
    let mut plan = Vec::new();
    let mut column_cursor = 0usize;
    for (member_idx, member) in members {
        if member.is_index && has_external_index {
            plan.push(PlanStep {
                member: *member_idx,
                slot: 0,
                ty: member.ty,
                op: ScalarOp::Index,
            });
            continue;
        }
        if member.is_foreign_key {
            plan.push(PlanStep {
                member: *member_idx,
                slot: 0,
                ty: member.ty,
                op: ScalarOp::ForeignKey,
            });
            continue;
        }
        if member.ty == ElementType::String {
            for slot in 0..member.cardinality {
                let col = columns
                    .get(column_cursor)
                    .ok_or(Error::SchemaArityMismatch { schema_len: members.len(), file_len: columns.len() })?;
                plan.push(PlanStep {
                    member: *member_idx,
                    slot,
                    ty: member.ty,
                    op: ScalarOp::StringImmediate { bit_offset: col.bit_offset },
                });
                column_cursor += 1;
            }
            continue;
        }
        // A palette-array column covers the whole run with one file column.
        let first = columns.get(column_cursor);
        if let Some(col) = first {
            if col.compression == CompressionKind::PaletteArray {
                plan.push(PlanStep {
                    member: *member_idx,
                    slot: 0,
                    ty: member.ty,
                    op: ScalarOp::PaletteArray { field_index: column_cursor as u32, bit_offset: col.bit_offset, bit_width: col.bit_width },
                });
                column_cursor += 1;
                continue;
            }
        }
        for slot in 0..member.cardinality {
            let col = columns
                .get(column_cursor)
                .ok_or(Error::SchemaArityMismatch { schema_len: members.len(), file_len: columns.len() })?;
            let op = match col.compression {
                CompressionKind::None | CompressionKind::Immediate => {
                    if let Some(max_width) = member.ty.bit_width() {
                        if col.bit_width > max_width {
                            return Err(Error::TypeMismatch { member: member.name, bits: col.bit_width });
                        }
                    }
                    ScalarOp::Immediate { bit_offset: col.bit_offset, bit_width: col.bit_width }
                }
                CompressionKind::Palette => ScalarOp::Palette {
                    field_index: column_cursor as u32,
                    bit_offset: col.bit_offset,
                    bit_width: col.bit_width,
                },
                CompressionKind::CommonData => {
                    ScalarOp::CommonData { field_index: column_cursor as u32, default: col.default }
                }
                CompressionKind::PaletteArray => {
                    return Err(Error::UnsupportedLayout("palette-array compression on a non-leading array slot"))
                }
            };
            plan.push(PlanStep { member: *member_idx, slot, ty: member.ty, op });
            column_cursor += 1;
        }
    }
    Ok(plan)
}

pub(crate) fn execute_plan<T: DbcRecord>(plan: &Plan, reader: &mut RecordReader, index_value: u32, record: &mut T) -> Result<()> {
    for step in plan {
        let value = match step.op {
            ScalarOp::Index => match step.ty {
                ElementType::U32 => crate::value::FieldValue::U32(index_value),
                ElementType::I32 => crate::value::FieldValue::I32(index_value as i32),
                other => return Err(Error::UnsupportedKeyType(other.name())),
            },
            ScalarOp::ForeignKey => reader.read_foreign_key()?,
            ScalarOp::Immediate { bit_offset, bit_width } => reader.read_immediate(step.ty, bit_offset, bit_width)?,
            ScalarOp::StringImmediate { bit_offset } => reader.read_string_immediate(bit_offset)?,
            ScalarOp::Palette { field_index, bit_offset, bit_width } => {
                let (raw, _, _) = reader.cursor.read_bits_at(bit_offset as usize / 8, bit_offset % 8, bit_width)?;
                reader.read_palette(step.ty, field_index, raw as u32)?
            }
            ScalarOp::PaletteArray { field_index, bit_offset, bit_width } => {
                let (raw, _, _) = reader.cursor.read_bits_at(bit_offset as usize / 8, bit_offset % 8, bit_width)?;
                reader.read_palette_array(step.ty, field_index, raw as u32, step.slot)?
            }
            ScalarOp::CommonData { field_index, default } => reader.read_common(step.ty, field_index, &default)?,
        };
        record.assign(step.member, step.slot, value);
    }
    Ok(())
}

fn columns_digest(columns: &[FieldMetadata], has_relationship: bool) -> u64 {
    let mut hasher = DefaultHasher::new();
    columns.hash(&mut hasher);
    has_relationship.hash(&mut hasher);
    hasher.finish()
}

type PlanCache = Mutex<HashMap<(TypeId, u64), Arc<Plan>>>;

fn plan_cache() -> &'static PlanCache {
    static CACHE: OnceLock<PlanCache> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Returns a cached plan for `T` against this exact column layout, building
/// and inserting one if absent. Keyed on the actual column metadata rather
/// than just the file signature, since two files sharing a signature and
/// record type can still carry different per-file field layouts; two
/// threads racing to build the same key is harmless; whichever entry lands
/// first is equally valid and is what every later reader sees.
pub(crate) fn cached_plan<T: DbcRecord + 'static>(
    members: &[(usize, &crate::schema::Member)],
    columns: &[FieldMetadata],
    has_relationship: bool,
    has_external_index: bool,
) -> Result<Arc<Plan>> {
    let mut hasher_seed = columns_digest(columns, has_relationship);
    hasher_seed = hasher_seed.rotate_left(1) ^ (has_external_index as u64);
    let key = (TypeId::of::<T>(), hasher_seed);
    if let Some(plan) = plan_cache().lock().unwrap().get(&key) {
        return Ok(plan.clone());
    }
    let plan = Arc::new(build_plan(members, columns, has_external_index)?);
    plan_cache().lock().unwrap().entry(key).or_insert_with(|| plan.clone());
    Ok(plan)
}
