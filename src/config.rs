use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::http::HeaderValue;
use clap::Parser;

/// Local preview service for files with disguised extensions.
#[derive(Debug, Clone, Parser)]
#[command(name = "hextview", version, about)]
pub struct Config {
    /// Port to listen on.
    #[arg(long, env = "API_PORT", default_value_t = 4020)]
    pub port: u16,

    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Largest accepted upload request, in bytes.
    #[arg(long, default_value_t = 1024 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// How long a fetched download stays available before it is released.
    #[arg(long, default_value_t = 2000)]
    pub release_delay_ms: u64,

    /// How long an unfetched download stays available.
    #[arg(long, default_value_t = 300)]
    pub ticket_ttl_secs: u64,

    /// Origin allowed to call the API from a browser. CORS is off when unset.
    #[arg(long, value_parser = parse_origin)]
    pub cors_origin: Option<HeaderValue>,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.release_delay_ms)
    }

    pub fn ticket_ttl(&self) -> Duration {
        Duration::from_secs(self.ticket_ttl_secs)
    }
}

fn parse_origin(value: &str) -> Result<HeaderValue, String> {
    value
        .parse::<HeaderValue>()
        .map_err(|err| format!("invalid origin {value:?}: {err}"))
}
