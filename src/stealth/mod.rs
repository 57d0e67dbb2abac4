use anyhow::Result;
use chromiumoxide::{Page, cdp};
use futures::future::join_all;
use tracing::{debug, warn};

mod config;
mod scripts;

pub use config::StealthProfile;
pub use scripts::EVASION_SCRIPTS;

/// Render the bootstrap script that exposes the profile to the evasions
#[must_use]
pub fn profile_bootstrap(profile: &StealthProfile) -> String {
    let languages =
        serde_json::to_string(&profile.languages).unwrap_or_else(|_| "[]".to_string());
    format!(
        r"
        window.__stealthProfile = {{
            vendor: {vendor},
            platform: {platform},
            languages: {languages},
            hardwareConcurrency: {cores},
            screenWidth: {width},
            screenHeight: {height}
        }};
        ",
        vendor = serde_json::Value::String(profile.vendor.clone()),
        platform = serde_json::Value::String(profile.platform.clone()),
        cores = profile.hardware_concurrency,
        width = profile.viewport_width,
        height = profile.viewport_height,
    )
}

async fn add_init_script(page: &Page, source: String) -> Result<()> {
    page.execute(
        cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams {
            source,
            include_command_line_api: None,
            world_name: None,
            run_immediately: None,
        },
    )
    .await?;
    Ok(())
}

/// Install evasions on a blank page before its first navigation
///
/// Scripts are registered with `addScriptToEvaluateOnNewDocument`, so they
/// run ahead of any site script on every document the page loads. Returns
/// the number of evasion scripts that were registered.
///
/// # Errors
///
/// Fails if the profile bootstrap cannot be registered, if no evasion script
/// could be registered, or if the user-agent or viewport override fails.
pub async fn inject(page: &Page, profile: &StealthProfile) -> Result<usize> {
    debug!("Registering stealth profile bootstrap");
    add_init_script(page, profile_bootstrap(profile)).await?;

    let results = join_all(EVASION_SCRIPTS.iter().map(|(name, source)| {
        let page = page.clone();
        async move { (*name, add_init_script(&page, (*source).to_string()).await) }
    }))
    .await;

    let mut injected = 0;
    for (name, result) in results {
        match result {
            Ok(()) => {
                debug!("✓ Injected: {name}");
                injected += 1;
            }
            Err(e) => warn!("✗ Failed to inject {name}: {e}"),
        }
    }

    if injected == 0 {
        return Err(anyhow::anyhow!(
            "Failed to inject any of {} stealth scripts",
            EVASION_SCRIPTS.len()
        ));
    }

    page.execute(cdp::browser_protocol::network::SetUserAgentOverrideParams {
        user_agent: profile.user_agent.clone(),
        accept_language: Some(profile.accept_language.clone()),
        platform: Some(profile.platform.clone()),
        user_agent_metadata: None,
    })
    .await?;

    page.execute(
        cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(profile.viewport_width))
            .height(i64::from(profile.viewport_height))
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(anyhow::Error::msg)?,
    )
    .await?;

    debug!(
        "Stealth injection complete: {injected}/{} scripts active",
        EVASION_SCRIPTS.len()
    );
    Ok(injected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_escapes_profile_strings() {
        let profile = StealthProfile {
            vendor: "Google \"Inc.\"".to_string(),
            ..StealthProfile::default()
        };
        let script = profile_bootstrap(&profile);
        assert!(script.contains(r#"vendor: "Google \"Inc.\"""#));
        assert!(script.contains(r#"languages: ["en-US","en"]"#));
        assert!(script.contains("screenWidth: 1366"));
    }

    #[test]
    fn webdriver_and_image_patches_come_first() {
        let names: Vec<&str> = EVASION_SCRIPTS.iter().map(|(name, _)| *name).collect();
        assert_eq!(&names[..2], ["navigator_webdriver", "image_geometry"]);
    }
}
