pub mod application;
pub mod backend;
pub mod bluez;
pub mod config;
pub mod connector;
pub mod device;
pub mod error;
pub mod input;
pub mod logger;
pub mod opts;
pub mod permission;
pub mod registry;
pub mod scanner;
pub mod screen;
pub mod view;
