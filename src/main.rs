//! # Voxel Streaming Entry Point
//!
//! This is the entry point for the headless driver. It simply calls into the library's
//! `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info VOXEL_STREAMING_CONFIG=streaming.json cargo run --release
//! ```

fn main() {
    voxel_streaming::run();
}
