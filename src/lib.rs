//! Freight desk: tanker freight rates, FFA curves, Q88 vessel data and
//! broker position lists behind one HTTP service

pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod fetchers;
pub mod mock;
pub mod models;
pub mod reconcile;
pub mod scheduler;
pub mod upstream;
