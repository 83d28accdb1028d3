//! End-to-end CLI tests driving `wasmpub build` with stand-in tools.

#![cfg(unix)]

mod build_tests;
