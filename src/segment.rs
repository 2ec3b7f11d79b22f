/// Identifies a logical block of the file. Present segments vary by
/// version: WDBC/WDB2 only ever have `Records` and `StringBlock`; WDB5 adds
/// the offset/index/copy/field-info segments; WDC1 adds pallet/common/
/// relationship/extended-field-info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentId {
    Header,
    Records,
    StringBlock,
    OffsetMap,
    IndexTable,
    CopyTable,
    FieldInfo,
    PalletData,
    CommonData,
    RelationshipData,
    ExtendedFieldInfo,
}

#[derive(Debug, Clone)]
struct SegmentNode {
    id: SegmentId,
    length: u64,
    prev: Option<usize>,
    next: Option<usize>,
    /// Memoized absolute offset from the start of the file; invalidated
    /// (set to `None`) whenever a segment is inserted earlier in the chain.
    start_offset: Option<u64>,
}

/// An arena of segments linked by index rather than by pointer, so the
/// chain can be walked, inserted into and offset-queried without the
/// aliasing/lifetime trouble a pointer-linked list would bring.
#[derive(Debug, Default, Clone)]
pub(crate) struct SegmentChain {
    nodes: Vec<SegmentNode>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl SegmentChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, id: SegmentId, length: u64) -> usize {
        let start_offset = match self.tail {
            None => Some(0),
            Some(tail) => self.nodes[tail].start_offset.map(|o| o + self.nodes[tail].length),
        };
        let idx = self.nodes.len();
        self.nodes.push(SegmentNode {
            id,
            length,
            prev: self.tail,
            next: None,
            start_offset,
        });
        if let Some(tail) = self.tail {
            self.nodes[tail].next = Some(idx);
        } else {
            self.head = Some(idx);
        }
        self.tail = Some(idx);
        idx
    }

    pub fn insert_after(&mut self, after: usize, id: SegmentId, length: u64) -> usize {
        let next = self.nodes[after].next;
        let idx = self.nodes.len();
        self.nodes.push(SegmentNode {
            id,
            length,
            prev: Some(after),
            next,
            start_offset: None,
        });
        self.nodes[after].next = Some(idx);
        match next {
            Some(n) => self.nodes[n].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.invalidate_from(idx);
        idx
    }

    pub fn insert_before(&mut self, before: usize, id: SegmentId, length: u64) -> usize {
        let prev = self.nodes[before].prev;
        let idx = self.nodes.len();
        self.nodes.push(SegmentNode {
            id,
            length,
            prev,
            next: Some(before),
            start_offset: None,
        });
        self.nodes[before].prev = Some(idx);
        match prev {
            Some(p) => self.nodes[p].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.invalidate_from(idx);
        idx
    }

    /// Clears the memoized offsets for `from` and everything after it; the
    /// next `start_offset` query recomputes them by walking forward.
    fn invalidate_from(&mut self, from: usize) {
        let mut cur = Some(from);
        while let Some(i) = cur {
            self.nodes[i].start_offset = None;
            cur = self.nodes[i].next;
        }
    }

    pub fn find(&self, id: SegmentId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn is_present(&self, id: SegmentId) -> bool {
        self.find(id).is_some()
    }

    pub fn length(&self, idx: usize) -> u64 {
        self.nodes[idx].length
    }

    /// Absolute byte offset of segment `idx` from the start of the file,
    /// recomputing and re-memoizing along the way if it was invalidated.
    pub fn start_offset(&mut self, idx: usize) -> u64 {
        if let Some(offset) = self.nodes[idx].start_offset {
            return offset;
        }
        let offset = match self.nodes[idx].prev {
            None => 0,
            Some(prev) => self.start_offset(prev) + self.nodes[prev].length,
        };
        self.nodes[idx].start_offset = Some(offset);
        offset
    }

    pub fn offset_of(&mut self, id: SegmentId) -> Option<u64> {
        let idx = self.find(id)?;
        Some(self.start_offset(idx))
    }

    pub fn length_of(&self, id: SegmentId) -> Option<u64> {
        self.find(id).map(|idx| self.length(idx))
    }
}
