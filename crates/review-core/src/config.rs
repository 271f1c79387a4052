use anyhow::Result;

/// Orchestrator-side configuration loaded from the environment.
///
/// No `.env` fallback — this process expects its environment to be set by
/// whatever deploys it, not by a checked-in file.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub http_timeout_minutes: u64,
    pub pr_agent_url: String,
    pub semgrep_service_url: String,
    pub summarizer_url: String,
    pub github_mcp_url: String,
    pub scratch_root: String,
    pub git_host: String,
    pub pipeline_timeout_minutes: u64,
}

fn get_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            listen_addr: get_str("LISTEN_ADDR", "0.0.0.0:8080"),
            log_level: get_str("LOG_LEVEL", "info"),
            http_timeout_minutes: get_u64("HTTP_TIMEOUT_MINUTES", 15),
            pr_agent_url: get_str("PR_AGENT_URL", ""),
            semgrep_service_url: get_str("SEMGREP_SERVICE_URL", ""),
            summarizer_url: get_str("SUMMARIZER_URL", ""),
            github_mcp_url: get_str("GITHUB_MCP_URL", ""),
            scratch_root: get_str("SCRATCH_ROOT", &std::env::temp_dir().to_string_lossy()),
            git_host: get_str("GIT_HOST", "github.com"),
            pipeline_timeout_minutes: get_u64("PIPELINE_TIMEOUT_MINUTES", 20),
        })
    }
}

/// Security Scan Service's own configuration (a distinct deployable process).
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub port: u16,
    pub log_level: String,
    pub semgrep_app_token: Option<String>,
    pub scan_configs: Vec<String>,
    /// Base URL of the remote scanning RPC tool consulted per configuration
    /// attempt (spec §4.4's `tools/call` target).
    pub scan_tool_url: String,
}

fn default_scan_configs() -> Vec<String> {
    vec![
        "p/default".to_string(),
        "p/security-audit".to_string(),
        "p/ci".to_string(),
    ]
}

impl ScanConfig {
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("SEMGREP_APP_TOKEN").ok().filter(|s| !s.is_empty());
        let scan_configs = match std::env::var("SEMGREP_CONFIGS") {
            Ok(raw) if !raw.is_empty() => {
                raw.split(',').map(|s| s.trim().to_string()).collect()
            }
            _ => default_scan_configs(),
        };
        Ok(ScanConfig {
            port: get_u64("PORT", 8081) as u16,
            log_level: get_str("LOG_LEVEL", "info"),
            semgrep_app_token: token,
            scan_configs,
            scan_tool_url: get_str("SEMGREP_TOOL_URL", ""),
        })
    }
}

/// Source-Control Adapter's own configuration.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub port: u16,
    pub log_level: String,
    pub default_owner: String,
    pub default_repo: String,
    /// Bearer credential for the downstream source-control API. Optional —
    /// the adapter's auth to that API is out of scope per spec §1, but a
    /// minimal bearer call still needs somewhere to read a token from.
    pub github_token: Option<String>,
}

impl AdapterConfig {
    pub fn from_env() -> Result<Self> {
        Ok(AdapterConfig {
            port: get_u64("PORT", 8082) as u16,
            log_level: get_str("LOG_LEVEL", "info"),
            default_owner: get_str("ADAPTER_DEFAULT_OWNER", ""),
            default_repo: get_str("ADAPTER_DEFAULT_REPO", ""),
            github_token: std::env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_config_defaults_to_three_configs_in_order() {
        std::env::remove_var("SEMGREP_CONFIGS");
        let cfg = ScanConfig::from_env().unwrap();
        assert_eq!(cfg.scan_configs, vec!["p/default", "p/security-audit", "p/ci"]);
    }

    #[test]
    fn scan_config_honors_override() {
        std::env::set_var("SEMGREP_CONFIGS", "p/one, p/two");
        let cfg = ScanConfig::from_env().unwrap();
        assert_eq!(cfg.scan_configs, vec!["p/one", "p/two"]);
        std::env::remove_var("SEMGREP_CONFIGS");
    }

    #[test]
    fn empty_bearer_token_is_treated_as_absent() {
        std::env::set_var("SEMGREP_APP_TOKEN", "");
        let cfg = ScanConfig::from_env().unwrap();
        assert!(cfg.semgrep_app_token.is_none());
        std::env::remove_var("SEMGREP_APP_TOKEN");
    }
}
