//! Shared fixtures for unit tests: PNG encoding and a local HTTP image server.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tiny_http::{Header, Response, Server};

pub(crate) fn png_bytes(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, color))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub(crate) fn write_png(path: &Path, width: u32, height: u32, color: Rgba<u8>) {
    RgbaImage::from_pixel(width, height, color).save(path).unwrap();
}

/// Serves the same PNG body for every path, except paths containing
/// "missing" which get a 404. Counts every request it sees.
pub(crate) struct ImageServer {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl ImageServer {
    pub(crate) fn start(body: Vec<u8>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        thread::spawn(move || {
            for request in server.incoming_requests() {
                counter.fetch_add(1, Ordering::SeqCst);
                if request.url().contains("missing") {
                    let _ = request.respond(Response::from_string("not found").with_status_code(404));
                } else {
                    let header = "Content-Type: image/png".parse::<Header>().unwrap();
                    let _ = request.respond(Response::from_data(body.clone()).with_header(header));
                }
            }
        });

        Self {
            base: format!("http://127.0.0.1:{port}"),
            hits,
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
