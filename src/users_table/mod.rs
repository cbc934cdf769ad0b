//! Client-side state for the usuarios table: connectivity, the cached
//! records, sorting and paging.

pub mod api;
pub mod controller;
pub mod model;

pub use api::{ApiError, HttpUsersApi, UsersApi};
pub use controller::{ActionError, Connection, PageSummary, SortDirection, UsersTable};
pub use model::{NewUser, User};
