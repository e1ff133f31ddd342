pub mod delete;
pub mod insert;
pub mod render;
pub mod update;
