//! Rate people across a fixed set of categories and rank them on a
//! leaderboard.
//!
//! Each new rating is folded into the running per-category means of the
//! subject's [`ScoreBoardEntry`](models::ScoreBoardEntry) without keeping the
//! rating history. A [`Selector`](selector::Selector) decides who is shown
//! next, either skipping subjects already rated or skipped in the current
//! pass, or cycling through everyone forever. All state lives in one
//! [`Session`](session::Session).

pub mod commands;
pub mod config;
pub mod handlers;
pub mod models;
pub mod scoring;
pub mod seed;
pub mod selector;
pub mod session;
pub mod tasks;
