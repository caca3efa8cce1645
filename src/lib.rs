// Safe Chat Filter: moderation decisions for single chat messages.
//
// This is the library root. Each module corresponds to one part of the
// system: the decision engine and its classifiers, the HTTP gateway that
// exposes it, and the debounced client that consumes it.

pub mod client;
pub mod config;
pub mod moderation;
pub mod output;
pub mod web;
