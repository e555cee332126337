//! Infrastructure layer for fleetdesk
//!
//! Everything that talks to the outside world: the Postgres connection and
//! repositories, the access-token provider chain, the TOML user roster, and
//! schema introspection helpers.

pub mod connection;
pub mod introspect;
pub mod repos;
pub mod sql_repository;
pub mod token;
pub mod users;

pub use connection::{Db, DbAuth, DbConfig};
pub use repos::{
    PgDeliveryRepository, PgReportingRepository, PgStoreRepository, PgVehicleRepository,
};
pub use sql_repository::{RowMap, SqlRepository, SqlValue};
pub use token::{AccessToken, AzureCliTokenProvider, EnvTokenProvider, TokenChain, TokenProvider};
pub use users::UserStore;
