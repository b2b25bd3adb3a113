use std::env;

/// Environment-driven iteration logging, independent of `verbosity`.
///
/// `PENCIL_DIAGNOSTICS=1` logs one row per outer iteration,
/// `PENCIL_DIAGNOSTICS_EVERY=k` thins that to every k-th iteration, and
/// `PENCIL_DIAGNOSTICS_TCG=0` drops the inner-solve line.
#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    pub enabled: bool,
    pub every: usize,
    pub log_inner: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { enabled: false, every: 1, log_inner: true }
    }
}

impl DiagnosticsConfig {
    pub fn from_env() -> Self {
        let enabled = match env::var("PENCIL_DIAGNOSTICS") {
            Ok(v) => v != "0" && v.to_lowercase() != "false",
            Err(_) => false,
        };

        let every = env::var("PENCIL_DIAGNOSTICS_EVERY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(1);

        let log_inner = env::var("PENCIL_DIAGNOSTICS_TCG")
            .ok()
            .map(|v| v != "0" && v.to_lowercase() != "false")
            .unwrap_or(true);

        Self { enabled, every, log_inner }
    }

    #[inline]
    pub fn should_log(&self, iter: usize) -> bool {
        self.enabled && (iter % self.every == 0)
    }
}
