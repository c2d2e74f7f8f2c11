//! Feature distribution viewer.
//!
//! Fetches histogram data for the requested dataset features from the
//! dataset API and draws one smoothed, filled line per life.

pub mod api_client;
pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod histogram;
pub mod input;
pub mod series;
pub mod ui;
pub mod view;
pub mod widgets;
