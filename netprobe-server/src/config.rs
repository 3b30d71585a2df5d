use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "netprobe", version, about = "Network diagnostics session server")]
pub struct Config {
    /// Host to bind to
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, default_value_t = 9999)]
    pub port: u16,

    /// Start with the demo users Alice, Bob and Charlie registered
    #[arg(long)]
    pub seed_demo_users: bool,

    /// Connect timeout for each probe attempt, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub probe_timeout_ms: u64,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::parse_from(["netprobe"]);
        assert_eq!(cfg.addr(), "localhost:9999");
        assert!(!cfg.seed_demo_users);
        assert_eq!(cfg.probe_timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn overrides() {
        let cfg = Config::parse_from(["netprobe", "--host", "0.0.0.0", "-p", "4000", "--seed-demo-users"]);
        assert_eq!(cfg.addr(), "0.0.0.0:4000");
        assert!(cfg.seed_demo_users);
    }
}
