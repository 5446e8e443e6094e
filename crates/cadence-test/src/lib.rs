//! Cadence scheduling server - integration test support.
//!
//! Re-exports the workspace crates under one roof so integration tests can
//! reach every layer from a single dependency.

pub mod component {
    pub use cadence_core::{config, constants, error};
    pub use cadence_recur as recur;
    pub use cadence_service::{attendance, context, pagination, schedule};

    pub mod db {
        pub use cadence_db::db::*;
        pub use cadence_db::error::{DbError, DbResult};
    }

    pub mod model {
        pub use cadence_db::model::*;
    }
}

pub mod app {
    pub use cadence_app::app::api;
    pub use cadence_app::config::ConfigHandler;
    pub use cadence_app::gateway_handler::GatewayHandler;
}
