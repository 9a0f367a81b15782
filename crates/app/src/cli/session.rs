use jiff::Timestamp;
use kiosk::navigation::Route;
use kiosk_app::{config::KioskConfig, context::KioskContext};
use tracing::info;

/// Log in with the configured PIN.
pub(crate) async fn login(context: &KioskContext, config: &KioskConfig) -> Result<(), String> {
    let pin = config
        .operator
        .pin
        .as_deref()
        .ok_or_else(|| "operator PIN is required (--pin or KIOSK_PIN)".to_string())?;

    context
        .session
        .login(pin)
        .await
        .map_err(|error| error.to_string())?;

    info!("operator logged in");

    Ok(())
}

/// Select the configured reader and load everything a checkout needs,
/// ending on the start screen.
pub(crate) async fn prepare_checkout(
    context: &mut KioskContext,
    config: &KioskConfig,
) -> Result<(), String> {
    context.navigate(Route::SelectReader, Timestamp::now());

    let reader = config
        .operator
        .reader
        .as_deref()
        .ok_or_else(|| "card reader is required (--reader or KIOSK_READER)".to_string())?;

    let reader = context
        .bootstrap
        .select_reader(reader)
        .await
        .map_err(|error| error.to_string())?;

    let settings = context
        .bootstrap
        .load_settings()
        .await
        .map_err(|error| error.to_string())?;

    context
        .bootstrap
        .load_default_members()
        .await
        .map_err(|error| error.to_string())?;

    info!(reader = %reader.name, theme = %settings.theme, "kiosk ready");

    context.navigate(Route::Start, Timestamp::now());

    Ok(())
}
