//! Interactive editing: pointer and keyboard handling, the undo log, and the session
//! object a host UI drives.

pub mod controller;
pub mod history;
pub mod input;
pub mod session;
