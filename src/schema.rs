//! Explicit, caller-built description of a record type, used in place of
//! runtime reflection (the language-neutral alternative this system was
//! designed against has none in Rust).

use crate::options::OpenOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    Bool,
    String,
}

impl ElementType {
    /// Width of one scalar of this type when it is read as a plain,
    /// byte-aligned or bit-packed immediate value. `None` for `String`,
    /// which is never itself bit-packed (its *index* into the string pool
    /// is what occupies the column).
    pub fn bit_width(self) -> Option<u32> {
        match self {
            ElementType::I8 | ElementType::U8 | ElementType::Bool => Some(8),
            ElementType::I16 | ElementType::U16 => Some(16),
            ElementType::I32 | ElementType::U32 | ElementType::F32 => Some(32),
            ElementType::I64 | ElementType::U64 => Some(64),
            ElementType::String => None,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ElementType::I8 | ElementType::I16 | ElementType::I32 | ElementType::I64
        )
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            ElementType::I8 => "i8",
            ElementType::U8 => "u8",
            ElementType::I16 => "i16",
            ElementType::U16 => "u16",
            ElementType::I32 => "i32",
            ElementType::U32 => "u32",
            ElementType::I64 => "i64",
            ElementType::U64 => "u64",
            ElementType::F32 => "f32",
            ElementType::Bool => "bool",
            ElementType::String => "string",
        }
    }
}

/// Mirrors the source system's Fields/Properties member categories; a
/// schema can mix both and `OpenOptions::member_kind` selects which
/// category actually participates in decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: &'static str,
    pub ty: ElementType,
    pub cardinality: u32,
    pub is_index: bool,
    /// Populated from the relationship-data segment instead of a file
    /// column; absent on versions that carry no such segment.
    pub is_foreign_key: bool,
    pub ignore: bool,
    pub readonly: bool,
    pub kind: MemberKind,
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub members: Vec<Member>,
}

impl Schema {
    /// Members that participate in decoding under `opts`, paired with
    /// their position in `self.members` (the index a `DbcRecord` impl's
    /// `field`/`assign` methods key on).
    pub(crate) fn effective_members(&self, opts: &OpenOptions) -> Vec<(usize, &Member)> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.ignore)
            .filter(|(_, m)| m.kind == opts.member_kind)
            .filter(|(_, m)| !(opts.ignore_readonly && m.readonly))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    members: Vec<Member>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// A plain scalar field.
    pub fn field(self, name: &'static str, ty: ElementType) -> Self {
        self.push(Member {
            name,
            ty,
            cardinality: 1,
            is_index: false,
            is_foreign_key: false,
            ignore: false,
            readonly: false,
            kind: MemberKind::Field,
        })
    }

    /// A fixed-cardinality array field.
    pub fn array(self, name: &'static str, ty: ElementType, cardinality: u32) -> Self {
        self.push(Member {
            name,
            ty,
            cardinality,
            is_index: false,
            is_foreign_key: false,
            ignore: false,
            readonly: false,
            kind: MemberKind::Field,
        })
    }

    /// The member populated from the file's index table/offset map id
    /// rather than from a record column. Must be declared `i32` or `u32`.
    pub fn index(self, name: &'static str, ty: ElementType) -> Self {
        self.push(Member {
            name,
            ty,
            cardinality: 1,
            is_index: true,
            is_foreign_key: false,
            ignore: false,
            readonly: false,
            kind: MemberKind::Field,
        })
    }

    /// The member populated from the relationship-data segment. Must be
    /// declared `u32`; absent on files that carry no such segment.
    pub fn foreign_key(self, name: &'static str) -> Self {
        self.push(Member {
            name,
            ty: ElementType::U32,
            cardinality: 1,
            is_index: false,
            is_foreign_key: true,
            ignore: false,
            readonly: false,
            kind: MemberKind::Field,
        })
    }

    /// A member that consumes no column and is never assigned.
    pub fn ignored(self, name: &'static str, ty: ElementType) -> Self {
        self.push(Member {
            name,
            ty,
            cardinality: 1,
            is_index: false,
            is_foreign_key: false,
            ignore: true,
            readonly: false,
            kind: MemberKind::Field,
        })
    }

    /// A read-only property-style member (see `OpenOptions::ignore_readonly`).
    pub fn property(self, name: &'static str, ty: ElementType, readonly: bool) -> Self {
        self.push(Member {
            name,
            ty,
            cardinality: 1,
            is_index: false,
            is_foreign_key: false,
            ignore: false,
            readonly,
            kind: MemberKind::Property,
        })
    }

    /// Flattens a nested structure's members into this schema in place, so
    /// a nested struct member's fields become part of the outer column
    /// sequence at the position the struct member itself would occupy.
    pub fn nested(mut self, schema: Schema) -> Self {
        self.members.extend(schema.members);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            members: self.members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_flattens_in_place() {
        let inner = SchemaBuilder::new()
            .field("x", ElementType::I32)
            .field("y", ElementType::I32)
            .build();
        let outer = SchemaBuilder::new()
            .field("id", ElementType::U32)
            .nested(inner)
            .field("name", ElementType::String)
            .build();
        let names: Vec<_> = outer.members.iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["id", "x", "y", "name"]);
    }

    #[test]
    fn effective_members_filters_by_kind_and_readonly() {
        let schema = SchemaBuilder::new()
            .field("a", ElementType::I32)
            .property("b", ElementType::I32, true)
            .ignored("c", ElementType::I32)
            .build();
        let opts = OpenOptions {
            member_kind: MemberKind::Field,
            ..OpenOptions::default()
        };
        let effective = schema.effective_members(&opts);
        assert_eq!(effective.len(), 1);
        assert_eq!(effective[0].1.name, "a");
    }
}
