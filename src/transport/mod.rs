pub mod sse_server;
pub mod stdio;
pub mod web;
