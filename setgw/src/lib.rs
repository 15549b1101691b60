pub mod backend;
pub mod command;
pub mod config;
pub mod connection;
pub mod datamodel;
pub mod gateway;
pub mod server;
pub mod set;
pub mod sweeper;
