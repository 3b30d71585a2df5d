use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use crate::hardening::MAX_SCAN_CONCURRENCY;
use crate::probe::Probe;

/// Ports tried when checking whether a host is up. A refused connection
/// counts as an answer just like an accepted one.
const REACHABILITY_PORTS: &[u16] = &[80, 443, 22];

/// Probe built on plain TCP connects, so it needs no raw-socket privileges.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Knock {
    Open(Duration),
    Refused,
    Silent,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn resolve(&self, host: &str) -> io::Result<IpAddr> {
        let mut addrs = tokio::net::lookup_host((host, 0)).await?;
        addrs
            .next()
            .map(|a| a.ip())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses"))
    }

    async fn knock(&self, addr: SocketAddr) -> Knock {
        let started = Instant::now();
        match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Knock::Open(started.elapsed()),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => Knock::Refused,
            Ok(Err(_)) | Err(_) => Knock::Silent,
        }
    }

    async fn is_open(&self, addr: SocketAddr, attempts: u32) -> bool {
        for _ in 0..attempts {
            if matches!(self.knock(addr).await, Knock::Open(_)) {
                return true;
            }
        }
        false
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn host_online(&self, host: &str) -> String {
        let ip = match self.resolve(host).await {
            Ok(ip) => ip,
            Err(e) => return format!("{host} could not be resolved: {e}"),
        };

        let knocks = futures::future::join_all(
            REACHABILITY_PORTS.iter().map(|&port| self.knock(SocketAddr::new(ip, port))),
        )
        .await;

        if knocks.iter().any(|k| *k != Knock::Silent) {
            format!("{host} ({ip}) is online")
        } else {
            format!("{host} ({ip}) is offline or not responding")
        }
    }

    async fn scan_port_range(&self, ip: &str, start: u16, end: u16, num_requests: u32) -> String {
        let addr = match self.resolve(ip).await {
            Ok(addr) => addr,
            Err(e) => return format!("{ip} could not be resolved: {e}"),
        };

        let mut open: Vec<u16> = futures::stream::iter(start..=end)
            .map(|port| async move { (port, self.is_open(SocketAddr::new(addr, port), num_requests).await) })
            .buffer_unordered(MAX_SCAN_CONCURRENCY)
            .filter_map(|(port, is_open)| async move { is_open.then_some(port) })
            .collect()
            .await;
        open.sort_unstable();

        if open.is_empty() {
            format!("No open ports on {ip} in range {start}-{end}")
        } else {
            let list: Vec<String> = open.iter().map(u16::to_string).collect();
            format!("Open ports on {ip} in range {start}-{end}: {}", list.join(", "))
        }
    }

    async fn port_response_time(&self, ip: &str, port: u16, num_requests: u32) -> String {
        let addr = match self.resolve(ip).await {
            Ok(addr) => SocketAddr::new(addr, port),
            Err(e) => return format!("{ip} could not be resolved: {e}"),
        };

        let mut times = Vec::with_capacity(num_requests as usize);
        for _ in 0..num_requests {
            if let Knock::Open(rtt) = self.knock(addr).await {
                times.push(rtt);
            }
        }

        if times.is_empty() {
            return format!("Port {port} on {ip} is closed or filtered (0/{num_requests} replies)");
        }

        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        let min = times.iter().copied().min().unwrap_or_default();
        let max = times.iter().copied().max().unwrap_or_default();
        let avg = times.iter().sum::<Duration>() / times.len() as u32;
        format!(
            "Port {port} on {ip} is open ({}/{num_requests} replies): min {:.2} ms, avg {:.2} ms, max {:.2} ms",
            times.len(),
            ms(min),
            ms(avg),
            ms(max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn probe() -> TcpProbe {
        TcpProbe::new(Duration::from_millis(500))
    }

    async fn closed_port() -> u16 {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn scan_finds_listening_port() {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = l.local_addr().unwrap().port();

        let out = probe().scan_port_range("127.0.0.1", port, port, 1).await;
        assert_eq!(out, format!("Open ports on 127.0.0.1 in range {port}-{port}: {port}"));
    }

    #[tokio::test]
    async fn scan_reports_nothing_open() {
        let port = closed_port().await;
        let out = probe().scan_port_range("127.0.0.1", port, port, 2).await;
        assert_eq!(out, format!("No open ports on 127.0.0.1 in range {port}-{port}"));
    }

    #[tokio::test]
    async fn response_time_counts_replies() {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = l.local_addr().unwrap().port();

        let out = probe().port_response_time("127.0.0.1", port, 3).await;
        assert!(out.starts_with(&format!("Port {port} on 127.0.0.1 is open (3/3 replies)")), "{out}");
    }

    #[tokio::test]
    async fn response_time_on_closed_port() {
        let port = closed_port().await;
        let out = probe().port_response_time("127.0.0.1", port, 2).await;
        assert_eq!(out, format!("Port {port} on 127.0.0.1 is closed or filtered (0/2 replies)"));
    }

    #[tokio::test]
    async fn loopback_is_online() {
        // Refused connections still prove the host answered.
        let out = probe().host_online("127.0.0.1").await;
        assert_eq!(out, "127.0.0.1 (127.0.0.1) is online");
    }
}
