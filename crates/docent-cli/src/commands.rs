pub mod chat;
pub mod clear;
pub mod extract;
pub mod translate;
