// Thoughts: capture, views, and the powerful-score engine.
// The engine (scoring + similarity) is pure; store and handlers wrap it.

pub mod handlers;
pub mod models;
pub mod scoring;
pub mod similarity;
pub mod store;
pub mod views;
