//! Clients for the third-party services and external tools the domain talks to.

pub mod ai;
pub mod yt_dlp;
