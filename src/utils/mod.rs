//! Small self-contained helpers. None of these return errors: failures are
//! logged and mapped to a neutral value (`None`, `false` or an empty string).
pub mod files;
pub mod image;
pub mod invite;
pub mod time;
