//! End-to-end pipeline tests against stand-in compiler and binder scripts.

#![cfg(unix)]

mod common;
mod failure_tests;
mod publish_tests;
