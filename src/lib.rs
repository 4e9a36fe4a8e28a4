//! Area Scout - persona-driven area recommendations
//!
//! Enriches candidate areas from property, transit, crime, school and amenity
//! sources, ranks them for a persona and renders area videos through a
//! provider fallback chain.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
