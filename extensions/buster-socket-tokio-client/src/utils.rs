mod tcp_listener_to_host_port;
pub use tcp_listener_to_host_port::tcp_listener_to_host_port;
