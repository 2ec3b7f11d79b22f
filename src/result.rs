use thiserror::Error;

use crate::segment::SegmentId;

pub type Result<A, E = Error> = std::result::Result<A, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoFailed(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    EncodingFailed(#[from] declio::Error),
    #[error("unsupported signature: {0:?}")]
    UnsupportedSignature([u8; 4]),
    #[error("truncated input near offset {0}")]
    Truncated(u64),
    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),
    #[error("unsupported column layout: {0}")]
    UnsupportedLayout(&'static str),
    #[error("schema member `{member}` cannot hold a {bits}-bit column value")]
    TypeMismatch { member: &'static str, bits: u32 },
    #[error("schema declares {schema_len} members but the file carries {file_len} columns")]
    SchemaArityMismatch { schema_len: usize, file_len: usize },
    #[error("index column must be declared as i32 or u32, found {0}")]
    UnsupportedKeyType(&'static str),
    #[error("segment {0:?} is required but absent from this file")]
    MissingSegment(SegmentId),
}
