//! Wire-level request and response types for the catalog HTTP interface.
//!
//! - [`catalog`]: list parameters, list response, error body
//! - [`codec`]: JSON / named `MsgPack` body encoding

pub mod catalog;
pub mod codec;

pub use catalog::{ErrorBody, ListItemsParams, ListItemsResponse};
pub use codec::{CodecError, WireFormat, JSON_CONTENT_TYPE, MSGPACK_CONTENT_TYPE};
