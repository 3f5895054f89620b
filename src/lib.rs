pub mod audit;
pub mod auth;
pub mod configuration;
pub mod department;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod user;
pub mod validators;
