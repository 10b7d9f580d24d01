// Library crate exposing modules for the binary and integration tests

pub mod codec;
pub mod input;
pub mod model;
pub mod platform;
pub mod repository;
pub mod scanner;
pub mod util;
pub mod view;
pub mod viewmodel;
