//! MDMC CRM client library
//!
//! This library provides the client-side core of the MDMC CRM dashboard:
//! record schemas and validation, the REST client for the CRM backend, and
//! the authentication state broadcaster.
//!
//! # Modules
//!
//! - `api_client`: REST client, one method per backend endpoint.
//! - `auth`: Authentication state and subscriber notifications.
//! - `config`: Configuration management.
//! - `context`: Process-wide services wiring.
//! - `errors`: Error handling types.
//! - `models`: Records, enumerations and backend responses.
//! - `schemas`: Declarative validation rules for submitted forms.
//! - `validation`: Validation, error formatting, sanitization and predicates.

pub mod api_client;
pub mod auth;
pub mod config;
pub mod context;
pub mod errors;
pub mod models;
pub mod schemas;
pub mod validation;
