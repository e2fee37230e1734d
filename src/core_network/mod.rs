pub mod network;
pub mod pasv;
pub mod port;
pub mod port_pool;
pub mod stream;
