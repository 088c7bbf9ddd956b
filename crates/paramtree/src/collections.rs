//! Decoding of standard collections.
//!
//! Sequences and sets decode from arrays, maps from structs keyed by member
//! name. Elements are decoded with the same strategy as the container, and a
//! single element that fails to decode fails the whole container: no
//! partially filled collection is ever returned.

use crate::codec::{Decode, mismatch};
use crate::param::Param;
use crate::strategy::TypeError;
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};

fn decode_elements<T, C>(param: &Param<'_>) -> Result<Option<C>, TypeError>
where
    T: Decode,
    C: FromIterator<T>,
{
    if !param.is_array() {
        return mismatch(param, "expected array");
    }
    param.iter().map(|item| T::decode(&item)).collect()
}

fn decode_members<T, C>(param: &Param<'_>) -> Result<Option<C>, TypeError>
where
    T: Decode,
    C: FromIterator<(String, T)>,
{
    if !param.is_struct() {
        return mismatch(param, "expected struct");
    }
    param
        .iter()
        .map(|member| {
            let value = T::decode(&member)?;
            Ok(value.map(|value| (member.path().key().to_owned(), value)))
        })
        .collect()
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        decode_elements(param)
    }
}

impl<T: Decode> Decode for VecDeque<T> {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        decode_elements(param)
    }
}

impl<T: Decode> Decode for LinkedList<T> {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        decode_elements(param)
    }
}

impl<T: Decode + Ord> Decode for BTreeSet<T> {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        decode_elements(param)
    }
}

impl<T, S> Decode for HashSet<T, S>
where
    T: Decode + Eq + Hash,
    S: BuildHasher + Default,
{
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        decode_elements(param)
    }
}

impl<T: Decode> Decode for BTreeMap<String, T> {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        decode_members(param)
    }
}

impl<T, S> Decode for HashMap<String, T, S>
where
    T: Decode,
    S: BuildHasher + Default,
{
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        decode_members(param)
    }
}

impl<T, S> Decode for IndexMap<String, T, S>
where
    T: Decode,
    S: BuildHasher + Default,
{
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        decode_members(param)
    }
}
