#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod app;
mod domain;
mod infra;
mod ui;
mod util;

use dioxus::prelude::*;

#[cfg(feature = "desktop")]
use dioxus_desktop::{tao::window::WindowBuilder, Config as DesktopConfig};

use crate::util::version::APP_NAME;

fn main() {
    util::logging::init();
    tracing::info!(version = %util::version::version_label(), "starting {APP_NAME}");

    if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        apply_wayland_defaults();
    }

    let builder = LaunchBuilder::new();

    #[cfg(feature = "desktop")]
    let builder = {
        let config = desktop! {
            DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title(APP_NAME)
            )
        };
        builder.with_cfg(config)
    };

    #[cfg(not(feature = "desktop"))]
    let builder = builder;

    builder.launch(app::App);
}

/// Renderer settings that keep the webview stable under Wayland. Values already
/// present in the environment win.
fn apply_wayland_defaults() {
    const DEFAULTS: [(&str, &str); 2] = [
        ("WGPU_BACKEND", "gl"),
        ("WEBKIT_DISABLE_DMABUF_RENDERER", "1"),
    ];
    for (key, value) in DEFAULTS {
        if std::env::var_os(key).is_none() {
            tracing::debug!(key, value, "applying wayland renderer default");
            std::env::set_var(key, value);
        }
    }
}
