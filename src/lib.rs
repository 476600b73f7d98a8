//! Explore crowdsourced nearby experiences on a Braille terminal map.
//!
//! The list panel and the map always show the same filtered set; clicking
//! either one highlights the other.

pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod form;
pub mod geo;
pub mod hash;
pub mod itinerary;
pub mod list;
pub mod location;
pub mod logging;
pub mod map;
pub mod model;
pub mod repository;
pub mod store;
pub mod toast;
pub mod ui;
