//! Library exports for the URL shortener application
//!
//! This module exposes internal components for testing and potential library usage.

pub mod access;
pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod keygen;
pub mod middleware;
pub mod model;
pub mod password;
pub mod route;
pub mod session;
