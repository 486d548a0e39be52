//! Weather Report - coordinate / city lookup form over the Open-Meteo APIs
//!
//! This library exposes the app's modules for testing.

pub mod action;
pub mod api;
pub mod components;
pub mod effect;
pub mod reducer;
pub mod state;
pub mod weather_code;
