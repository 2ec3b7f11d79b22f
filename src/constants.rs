use declio::ctx::Endian;

pub const ENDIANESS: Endian = Endian::Little;

pub const SIG_WDBC: [u8; 4] = *b"WDBC";
pub const SIG_WDB2: [u8; 4] = *b"WDB2";
pub const SIG_WDB5: [u8; 4] = *b"WDB5";
pub const SIG_WDC1: [u8; 4] = *b"WDC1";
