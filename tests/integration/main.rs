//! Integration tests against a mock wiki server

mod mock_server;

mod config;
mod continuation;
mod engine;
mod login;
mod pages;
mod tokens;
