//! Engine instance configuration

/// Settings for a bridge-enabled engine instance
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Global name of the parser constructor
    pub binding_name: String,
    /// QuickJS heap limit in bytes
    pub memory_limit: usize,
    /// QuickJS stack limit in bytes
    pub max_stack_size: usize,
    /// Install `console` forwarding to tracing
    pub console: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            binding_name: "htmlParser".to_string(),
            memory_limit: 32 * 1024 * 1024,
            max_stack_size: 1024 * 1024,
            console: true,
        }
    }
}

impl BridgeConfig {
    pub fn with_binding_name(mut self, name: impl Into<String>) -> Self {
        self.binding_name = name.into();
        self
    }

    pub fn without_console(mut self) -> Self {
        self.console = false;
        self
    }
}
