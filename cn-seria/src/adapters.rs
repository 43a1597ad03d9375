//! Container and option adapters.
//!
//! These sit between the visitor surface and the domain traversals: they call
//! `begin_array`/`begin_map`/`seria_*` and nothing else. They are free
//! functions rather than blanket `Seriable` impls so that byte arrays keep
//! their own primitive encoding (`Vec<u8>` is a length-prefixed blob, not a
//! sequence of varints).

use std::collections::BTreeMap;

use crate::error::SeriaResult;
use crate::ser::{Seria, Seriable};

/// Sequence: varint count, then the elements back-to-back.
pub fn seria_vec<S, T>(seria: &mut S, value: &mut Vec<T>) -> SeriaResult<()>
where
    S: Seria,
    T: Seriable + Default,
{
    let mut size = value.len();
    seria.begin_array(&mut size, false)?;
    if seria.is_input() {
        value.clear();
        for _ in 0..size {
            let mut element = T::default();
            element.seria(seria)?;
            value.push(element);
        }
    } else {
        for element in value.iter_mut() {
            element.seria(seria)?;
        }
    }
    seria.end_array()
}

/// Fixed-size sequence: `expected` elements back-to-back, no count on the
/// wire. The caller owns the count's provenance (another field, a protocol
/// constant).
pub fn seria_fixed_vec<S, T>(seria: &mut S, value: &mut Vec<T>, expected: usize) -> SeriaResult<()>
where
    S: Seria,
    T: Seriable + Default,
{
    let mut size = expected;
    seria.begin_array(&mut size, true)?;
    if seria.is_input() {
        value.clear();
        value.reserve(size);
        for _ in 0..size {
            let mut element = T::default();
            element.seria(seria)?;
            value.push(element);
        }
    } else {
        debug_assert_eq!(value.len(), expected);
        for element in value.iter_mut() {
            element.seria(seria)?;
        }
    }
    seria.end_array()
}

/// Mapping: varint count, then key/value pairs. `BTreeMap` iteration makes
/// the encoded order ascending regardless of how the map was built; decode
/// stays lenient and accepts any key order.
pub fn seria_map<S, V>(seria: &mut S, value: &mut BTreeMap<String, V>) -> SeriaResult<()>
where
    S: Seria,
    V: Seriable + Default,
{
    let mut size = value.len();
    seria.begin_map(&mut size)?;
    if seria.is_input() {
        value.clear();
        for _ in 0..size {
            let mut key = String::new();
            seria.next_map_key(&mut key)?;
            let mut element = V::default();
            element.seria(seria)?;
            value.insert(key, element);
        }
    } else {
        for (key, element) in value.iter_mut() {
            let mut key = key.clone();
            seria.next_map_key(&mut key)?;
            element.seria(seria)?;
        }
    }
    seria.end_map()
}

/// Option: bool presence byte, then the payload when present.
pub fn seria_option<S, T>(seria: &mut S, value: &mut Option<T>) -> SeriaResult<()>
where
    S: Seria,
    T: Seriable + Default,
{
    let mut present = value.is_some();
    seria.seria_bool(&mut present)?;
    if seria.is_input() {
        *value = if present {
            let mut inner = T::default();
            inner.seria(seria)?;
            Some(inner)
        } else {
            None
        };
    } else if let Some(inner) = value.as_mut() {
        inner.seria(seria)?;
    }
    Ok(())
}
