//! CLI command implementations.

pub(crate) mod list;
pub(crate) mod rename;
pub(crate) mod serve;

pub(crate) use list::ListArgs;
pub(crate) use rename::RenameArgs;
pub(crate) use serve::ServeArgs;
