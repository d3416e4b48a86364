//! Integration test suite.
//!
//! `install_flow` drives the library pipeline end-to-end over a real
//! temporary project; `cli` exercises the compiled binary.

mod cli;
mod install_flow;
