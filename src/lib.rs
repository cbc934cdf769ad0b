//! Same-origin proxy for the usuarios microservice and the controller that
//! drives the user table on top of it.

pub mod app;
pub mod config;
pub mod error;
pub mod state;
pub mod users_table;
pub mod usuarios;

#[cfg(test)]
pub(crate) mod test_support;
