//! Astro Admin Gateway
//!
//! This library provides the server side of the astrology platform's admin
//! dashboard: a gateway that proxies the platform backend, runs the
//! pending-report selection and bulk dispatch workflow, and issues the
//! operator session cookie.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
