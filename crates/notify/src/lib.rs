//! Listing notifications.
//!
//! [`render`] turns a catalog [`Item`](lookout_catalog::Item) into an
//! embed-style [`Notification`]; a [`Notifier`] delivers it to a channel.

pub mod discord;
pub mod error;
pub mod render;
pub mod sink;

pub use {
    discord::DiscordNotifier,
    error::{Error, Result},
    render::{Notification, render},
    sink::{LogNotifier, Notifier},
};
