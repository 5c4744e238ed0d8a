pub mod config;
pub mod controller;
pub mod cost_cache;
pub mod feature_state;
pub mod fetch;
pub mod highlight;
pub mod hover;
pub mod resolver;
pub mod session;
pub mod zoom;
