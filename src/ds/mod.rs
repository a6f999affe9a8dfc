//! Internal data structures shared by the eviction policies.

mod keyed_list;

pub(crate) use keyed_list::KeyedList;
