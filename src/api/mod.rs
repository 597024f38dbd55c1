//! # API Layer
//!
//! Transport adapters exposing the application workflows.

pub mod rest;
