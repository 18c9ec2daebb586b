//! Utility types for admin-inlines.
//!
//! - [`MultiValueDict`]: A dictionary that can hold multiple values per key,
//!   used for submitted form data.

mod multi_value_dict;

pub use multi_value_dict::MultiValueDict;
