pub mod config;
pub mod db;
pub mod help_popup;
pub mod keybinds;
pub mod logging;
pub mod tool;
pub mod ui;
pub mod which_key;
