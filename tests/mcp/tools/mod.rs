mod config;
mod extract;
