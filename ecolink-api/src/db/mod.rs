//! Database queries
//!
//! Every function returns `ecolink_common::Result`; business failures come
//! back as typed variants (`NotFound`, `Conflict`, …), never as strings.

pub mod events;
pub mod observations;
pub mod orgs;
pub mod profiles;
