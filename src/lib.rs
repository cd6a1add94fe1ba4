//! Library entrypoint for the cafe order service.
//!
//! Integration tests under `tests/` import the app state, routers,
//! controllers and services from here.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

pub mod services;

#[path = "views/flash.rs"]
pub mod flash;
#[path = "views/render.rs"]
pub mod render;
#[path = "views/templates.rs"]
pub mod templates;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub store: Arc<dyn services::store::Store>,
    pub settings: config::Settings,
}

impl AppState {
    pub fn new(settings: config::Settings, store: Arc<dyn services::store::Store>) -> Self {
        Self {
            hbs: templates::build_handlebars(),
            store,
            settings,
        }
    }
}
