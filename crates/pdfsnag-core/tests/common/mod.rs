#![allow(dead_code)]

pub mod pdf_server;
pub mod stub_renderer;
