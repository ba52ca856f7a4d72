// Code blocks from `README.md`, extracted by the build script.
#[cfg(feature = "skeptic")]
include!(concat!(env!("OUT_DIR"), "/skeptic-tests.rs"));
