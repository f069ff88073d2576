pub mod api_server;
pub mod virtual_clock;
