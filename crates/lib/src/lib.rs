//! wasmpub-lib: build and publish pipeline for WebAssembly clients
//!
//! This crate turns a cargo package into a set of static files a web server
//! can serve:
//! - `staging`: a fresh, empty staging directory per run
//! - `compile`: the release `.wasm` from the compiler
//! - `bindgen`: the web module and JavaScript glue from the binding generator
//! - `assets`: static files merged beside the generated ones
//! - `publish`: the staging directory swapped into the server's asset directory
//! - `pipeline`: the stages above, in order, failing fast

pub mod assets;
pub mod bindgen;
pub mod compile;
pub mod config;
pub mod consts;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod publish;
pub mod staging;
pub mod target;
pub mod util;
