use crate::schema::MemberKind;

/// Bitset selecting which optional segments are parsed at open time.
///
/// Segments outside the mask stay in the segment chain (offsets are
/// unaffected) but their handler never runs; a generator-emitted read
/// against one fails with `MissingSegment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentMask(u8);

impl SegmentMask {
    pub const NONE: Self = Self(0);
    pub const OFFSET_MAP: Self = Self(1 << 0);
    pub const INDEX_TABLE: Self = Self(1 << 1);
    pub const COPY_TABLE: Self = Self(1 << 2);
    pub const COMMON_DATA: Self = Self(1 << 3);
    pub const RELATIONSHIP_DATA: Self = Self(1 << 4);
    pub const ALL: Self = Self(0b0001_1111);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for SegmentMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Caller-provided options for `DbcFile::open_with_options`.
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    /// Which category of schema members participates in decoding.
    pub member_kind: MemberKind,
    /// Skip members flagged read-only.
    pub ignore_readonly: bool,
    /// Materialize copy-table entries as additional records (default true).
    pub copy_to_list: bool,
    /// Optional segments to parse at open.
    pub load_mask: SegmentMask,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            member_kind: MemberKind::Field,
            ignore_readonly: false,
            copy_to_list: true,
            load_mask: SegmentMask::ALL,
        }
    }
}
