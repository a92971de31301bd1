//! Login-page automation.

use crate::config::{Credentials, FetchConfig};
use crate::selectors;
use crate::surface::{BrowserSurface, WaitCondition};
use crate::{BpmError, Result};
use std::time::Duration;

/// Log into the site with the given credentials.
///
/// Walks the login form the way a user would: wait out the loader overlay,
/// fill both fields, submit with Enter, then wait for the account menu that
/// only renders for an authenticated session. Failure to leave the login
/// URL is an authentication failure; anything slower than the page-load
/// bound surfaces as a timeout.
pub async fn login<B: BrowserSurface + ?Sized>(
    surface: &B,
    credentials: &Credentials,
    config: &FetchConfig,
) -> Result<()> {
    let login_url = format!("{}/login", config.base_url);
    surface.navigate(&login_url).await?;

    wait_for(
        surface,
        WaitCondition::element_absent(selectors::LOADER),
        config.page_load_timeout,
    )
    .await?;
    wait_for(
        surface,
        WaitCondition::element_present(selectors::LOGIN_EMAIL),
        config.page_load_timeout,
    )
    .await?;
    wait_for(
        surface,
        WaitCondition::element_present(selectors::LOGIN_PASSWORD),
        config.page_load_timeout,
    )
    .await?;

    let email_field = surface.find_element(selectors::LOGIN_EMAIL).await?;
    surface.click(&email_field).await?;
    surface.send_text(&email_field, credentials.username()).await?;

    let password_field = surface.find_element(selectors::LOGIN_PASSWORD).await?;
    surface.click(&password_field).await?;
    surface
        .send_text(
            &password_field,
            &format!("{}{}", credentials.password(), selectors::KEY_ENTER),
        )
        .await?;

    let authenticated = surface
        .wait_until(
            WaitCondition::element_present(selectors::ACCOUNT_MENU),
            config.page_load_timeout,
        )
        .await?;

    let current = surface.current_url().await?;
    if current == login_url {
        return Err(BpmError::Auth(format!(
            "still on {login_url} after submitting credentials for {}",
            credentials.username()
        )));
    }
    if !authenticated {
        return Err(BpmError::Timeout {
            condition: WaitCondition::element_present(selectors::ACCOUNT_MENU).to_string(),
            waited_ms: config.page_load_timeout.as_millis() as u64,
        });
    }

    log::info!("logged in as {}", credentials.username());
    Ok(())
}

async fn wait_for<B: BrowserSurface + ?Sized>(
    surface: &B,
    condition: WaitCondition,
    timeout: Duration,
) -> Result<()> {
    if surface.wait_until(condition.clone(), timeout).await? {
        Ok(())
    } else {
        Err(BpmError::Timeout {
            condition: condition.to_string(),
            waited_ms: timeout.as_millis() as u64,
        })
    }
}
