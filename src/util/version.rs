pub const APP_NAME: &str = "Buyback Assistant";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.trim_start_matches(|ch| ch == 'v' || ch == 'V').to_string()
    } else {
        APP_VERSION.to_string()
    }
}
