mod analysis;
mod config;
mod fixtures;
mod info;
