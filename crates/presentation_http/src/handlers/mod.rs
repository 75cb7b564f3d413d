//! HTTP request handlers

pub mod collection;
pub mod common;
pub mod direct;
pub mod health;
pub mod sandbox;
