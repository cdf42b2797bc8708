//! Shared test utilities for the justified-gal test suite.
//!
//! Provides encoded image fixtures and a throwaway local HTTP server for
//! exercising the remote media path without touching the network.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let base = serve(200, png_bytes(6, 4));
//! let bytes = media::load(&client(), &MediaSource::Remote(format!("{base}/a.png")))?;
//! ```

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpListener;

// =========================================================================
// Image fixtures
// =========================================================================

/// A blank PNG of the given size, encoded in memory.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

// =========================================================================
// HTTP
// =========================================================================

/// Client that never routes through a proxy, so loopback servers are
/// reachable whatever the environment says.
pub fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// Serve `body` with `status` for every request on a loopback port.
///
/// Returns the base URL (`http://127.0.0.1:<port>`). The server thread
/// lives until the test process exits.
pub fn serve(status: u16, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            // request line and headers, up to the blank line
            while reader.read_line(&mut line).is_ok_and(|n| n > 0) {
                if line == "\r\n" || line == "\n" {
                    break;
                }
                line.clear();
            }
            let head = format!(
                "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).ok();
            stream.write_all(&body).ok();
        }
    });
    format!("http://{addr}")
}
