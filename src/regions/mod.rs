pub(crate) mod common_data;
pub(crate) mod copy_table;
pub(crate) mod field_info;
pub(crate) mod index_table;
pub(crate) mod offset_map;
pub(crate) mod palette;
pub(crate) mod relationship;
pub(crate) mod string_block;
