use crate::config::SearchConfig;

/// Browser identity presented to the target site
///
/// Values must stay mutually consistent: a Windows user agent with a
/// `MacIntel` platform is itself a detection signal.
#[derive(Debug, Clone)]
pub struct StealthProfile {
    pub user_agent: String,
    pub accept_language: String,
    pub platform: String,
    pub vendor: String,
    pub languages: Vec<String>,
    pub hardware_concurrency: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl StealthProfile {
    /// Derive a profile from the search configuration
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        let (viewport_width, viewport_height) = config.viewport();
        Self {
            user_agent: config.user_agent().to_string(),
            accept_language: config.accept_language().to_string(),
            viewport_width,
            viewport_height,
            ..Self::default()
        }
    }
}

impl Default for StealthProfile {
    fn default() -> Self {
        Self {
            user_agent: crate::utils::CHROME_USER_AGENT.to_string(),
            accept_language: crate::utils::ACCEPT_LANGUAGE.to_string(),
            platform: "Win32".to_string(),
            vendor: "Google Inc.".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
            hardware_concurrency: 8,
            viewport_width: crate::utils::VIEWPORT_WIDTH,
            viewport_height: crate::utils::VIEWPORT_HEIGHT,
        }
    }
}
