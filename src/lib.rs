#![doc = "The `timeline-api` library crate."]
#![doc = ""]
#![doc = "This crate contains the authentication core of the Timeline API: credential"]
#![doc = "validation, password hashing, session issuance/validation against an external"]
#![doc = "key-value store, and the middleware gate protecting authenticated routes."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;

// lib.rs primarily declares modules for the library crate.
// Application setup (pool/store connections, HttpServer) lives in main.rs.
