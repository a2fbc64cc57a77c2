#![allow(dead_code)]

pub mod stub_server;
pub mod utils;
