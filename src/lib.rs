pub mod api;
pub mod app;
pub mod braille;
pub mod cases;
pub mod data;
pub mod map;
pub mod model;
pub mod ui;
