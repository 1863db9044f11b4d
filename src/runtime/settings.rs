use crate::config;

/// Load settings, falling back to defaults. The second value explains a
/// fallback so it can be logged once logging is up.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                let msg = format!("invalid config, using defaults: {msg}");
                eprintln!("echodune: {msg}");
                (config::Settings::default(), Some(msg))
            } else {
                (s, None)
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            let msg = format!("failed to load config, using defaults: {e}");
            eprintln!("echodune: {msg}");
            (config::Settings::default(), Some(msg))
        }
    }
}
