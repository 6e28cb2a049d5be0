//! Various utilities

pub mod home;
pub mod logging;
pub mod path_resolve_home;
