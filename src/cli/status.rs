use crate::{config, info, success, warning};

pub fn status() {
    let settings = config::OAuthSettings::from_env();

    if settings.is_configured() {
        success!("Spotify credentials are configured");
    } else {
        warning!(
            "Spotify credentials are not configured. Set {} and {}.",
            config::CLIENT_ID_VAR,
            config::CLIENT_SECRET_VAR
        );
    }

    info!("Redirect URI: {}", settings.redirect_uri);
    info!("Scope: {}", settings.scope);
    info!("Database: {}", config::database_path().display());
}
