//! Request policy for the portal REST API

pub mod classify;
pub mod errors;
pub mod retry;
