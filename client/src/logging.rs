use env_logger::Env;

/// Installs `env_logger` with an `info` default filter.
///
/// Hosts call this once at startup; later calls are ignored.
pub fn init() {
    if env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .try_init()
        .is_ok()
    {
        log::debug!("Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();

        assert!(env_logger::Builder::new().try_init().is_err());
        assert_ne!(log::max_level(), log::LevelFilter::Off);
    }
}
