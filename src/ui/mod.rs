pub mod components;
pub mod format;
pub mod pages;
pub mod shell;
