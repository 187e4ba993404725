//! Wire types exchanged between the mine-web engine and its clients.

pub mod models;
pub mod protocol;
