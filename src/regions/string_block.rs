use crate::result::{Error, Result};

/// A block of null-terminated strings addressed by byte offset, as used by
/// every version's string pool (the empty string at offset 0 is always
/// valid, matching the convention of leaving index 0 reserved).
#[derive(Debug, Clone)]
pub(crate) struct StringBlockRegion {
    bytes: Vec<u8>,
}

impl StringBlockRegion {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn get(&self, offset: u32) -> Result<&str> {
        let start = offset as usize;
        let slice = self
            .bytes
            .get(start..)
            .ok_or(Error::Truncated(offset as u64))?;
        let end = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());
        std::str::from_utf8(&slice[..end]).map_err(|_| Error::InvalidHeader("string block entry is not valid utf-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_null_terminated_entries() {
        let region = StringBlockRegion::new(b"\0foo\0bar\0".to_vec());
        assert_eq!(region.get(0).unwrap(), "");
        assert_eq!(region.get(1).unwrap(), "foo");
        assert_eq!(region.get(5).unwrap(), "bar");
    }
}
