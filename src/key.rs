use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::record_trait::DbcRecord;
use crate::result::{Error, Result};
use crate::schema::ElementType;
use crate::value::FieldValue;

/// A record type's key member resolved once and reused for every
/// `key_of`/`set_key` call against that type. Built only for `i32`/`u32`
/// index members; any other declared type fails at resolution time rather
/// than on the first record read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeyAccessor {
    member: usize,
    ty: ElementType,
}

impl KeyAccessor {
    fn resolve<T: DbcRecord>() -> Result<Self> {
        let schema = T::schema();
        let (member, ty) = schema
            .members
            .iter()
            .enumerate()
            .find(|(_, m)| m.is_index)
            .map(|(i, m)| (i, m.ty))
            .ok_or(Error::InvalidHeader("schema declares no index member"))?;
        match ty {
            ElementType::I32 | ElementType::U32 => Ok(Self { member, ty }),
            other => Err(Error::UnsupportedKeyType(other.name())),
        }
    }

    pub fn get<T: DbcRecord>(&self, record: &T) -> u32 {
        match record.field(self.member, 0) {
            FieldValue::U32(v) => v,
            FieldValue::I32(v) => v as u32,
            _ => 0,
        }
    }

    pub fn set<T: DbcRecord>(&self, record: &mut T, key: u32) {
        let value = match self.ty {
            ElementType::I32 => FieldValue::I32(key as i32),
            _ => FieldValue::U32(key),
        };
        record.assign(self.member, 0, value);
    }
}

type KeyAccessorCache = Mutex<HashMap<TypeId, KeyAccessor>>;

fn cache() -> &'static KeyAccessorCache {
    static CACHE: OnceLock<KeyAccessorCache> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Returns `T`'s key accessor, resolving and caching it on first use.
pub(crate) fn key_accessor<T: DbcRecord + 'static>() -> Result<KeyAccessor> {
    let id = TypeId::of::<T>();
    if let Some(acc) = cache().lock().unwrap().get(&id) {
        return Ok(*acc);
    }
    let acc = KeyAccessor::resolve::<T>()?;
    cache().lock().unwrap().entry(id).or_insert(acc);
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, SchemaBuilder};

    #[derive(Debug, Default, Clone)]
    struct Keyed {
        id: u32,
    }

    impl DbcRecord for Keyed {
        fn schema() -> Schema {
            SchemaBuilder::new().index("id", ElementType::U32).build()
        }

        fn field(&self, _member: usize, _slot: u32) -> FieldValue {
            FieldValue::U32(self.id)
        }

        fn assign(&mut self, _member: usize, _slot: u32, value: FieldValue) {
            if let FieldValue::U32(v) = value {
                self.id = v;
            }
        }
    }

    #[test]
    fn get_and_set_round_trip() {
        let acc = key_accessor::<Keyed>().unwrap();
        let mut record = Keyed { id: 1 };
        assert_eq!(acc.get(&record), 1);
        acc.set(&mut record, 42);
        assert_eq!(record.id, 42);
    }

    #[derive(Debug, Default, Clone)]
    struct StringKeyed;

    impl DbcRecord for StringKeyed {
        fn schema() -> Schema {
            SchemaBuilder::new().index("id", ElementType::String).build()
        }

        fn field(&self, _member: usize, _slot: u32) -> FieldValue {
            FieldValue::String(String::new())
        }

        fn assign(&mut self, _member: usize, _slot: u32, _value: FieldValue) {}
    }

    #[test]
    fn non_integer_key_type_is_rejected() {
        let result = key_accessor::<StringKeyed>();
        assert!(matches!(result, Err(Error::UnsupportedKeyType(_))));
    }
}
