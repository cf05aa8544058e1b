pub mod content;
pub mod entity;
pub mod property;
pub mod setting;
pub mod structure;
