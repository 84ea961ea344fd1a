pub mod canonical;
pub mod chapters;
pub mod config;
pub mod media;
pub mod model;
pub mod service;
pub mod timeline;
