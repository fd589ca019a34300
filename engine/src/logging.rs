use log::debug;

/// Install the global logger.
///
/// `RUST_LOG` takes precedence over `default_filter`, and wgpu's own logs
/// pass through the same filter. Calling this twice keeps the first logger.
pub fn init(default_filter: &str) {
    if let Err(err) =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
            .try_init()
    {
        debug!("logger already installed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_does_not_panic() {
        init("debug");
        init("warn");
    }
}
