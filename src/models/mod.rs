//! Data-transfer records mirroring backend table rows.
//!
//! Every field is optional. Absent fields are left out of request bodies so the
//! backend fills in ids, defaults and timestamps.
pub mod attachment;
pub mod expense;
pub mod group;
pub mod note;
pub mod task;
pub mod user;

pub use attachment::*;
pub use expense::*;
pub use group::*;
pub use note::*;
pub use task::*;
pub use user::*;
