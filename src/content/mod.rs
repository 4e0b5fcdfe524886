//! Content rules shared by the listing routes.

pub mod crossref;
pub mod defaults;
pub mod hooks;
pub mod visibility;
