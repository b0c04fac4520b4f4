//! Typed headers not already covered by the `headers` crate
//! (`If-Match`/`If-None-Match`/`If-Modified-Since`/`If-Unmodified-Since`/
//! `Range`/`ETag`/`Last-Modified`/`Allow` are used directly from `headers`).

pub mod accept_patch;
pub mod accept_post;
pub mod digest;
pub mod link;
pub mod memento_datetime;
pub mod prefer;
pub mod slug;
