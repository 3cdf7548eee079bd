use std::net::TcpListener;

/// Mock-server tests skip themselves where binding loopback is not allowed.
pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}
