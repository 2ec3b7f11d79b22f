use std::fmt::Debug;

use crate::schema::Schema;
use crate::value::FieldValue;

/// Hand-implemented analogue of a reflective record type: rather than the
/// deserializer walking live struct fields through runtime reflection, a
/// type opts in by describing its own layout (`schema`) and exposing
/// positional get/set access keyed by that layout's member index.
///
/// `slot` addresses one element of an array member (`0` for scalar members).
pub trait DbcRecord: Default + Clone + Debug {
    fn schema() -> Schema;
    fn field(&self, member: usize, slot: u32) -> FieldValue;
    fn assign(&mut self, member: usize, slot: u32, value: FieldValue);
}
