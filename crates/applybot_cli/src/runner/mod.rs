pub mod app;
pub mod credentials;
pub mod effects;
pub mod render;
pub mod settings;
