pub mod config;
pub mod data;
pub mod figures;
pub mod page;
pub mod routes;
