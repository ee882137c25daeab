//! Future Self panel engine
//!
//! This library drives the "future self" design panel: a user picks a
//! profession, uploads a selfie, and the orchestrator compresses it, uploads
//! it through a pre-signed URL, polls for the processed portrait and places
//! it on the design host's canvas.

pub mod app_state;
pub mod config;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod telemetry;
