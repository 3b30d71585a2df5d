pub mod connection;
pub mod listener;
pub mod sink;
