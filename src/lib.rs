//! Pomodoro focus sessions framed as airline flights.
//!
//! [`geo`] and [`session::engine`] are the core: great-circle math and the
//! flight/pomodoro state machine. Everything else adapts them to a terminal
//! or a browser.

pub mod airport;
pub mod animation;
pub mod cli;
pub mod config;
pub mod error;
pub mod flight;
pub mod geo;
pub mod notification;
pub mod pomodoro;
pub mod session;
pub mod ws;
