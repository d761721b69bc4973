use anyhow::{Context as AnyhowContext, Result};
use std::net::SocketAddr;

/// Resolved listen addresses for `serve-http`.
///
/// The API deletes and uploads memes without any authentication, so a
/// target that reaches beyond loopback needs an explicit `--public`.
#[derive(Debug, Clone)]
pub(crate) struct BindTarget {
    bind: String,
    addrs: Vec<SocketAddr>,
}

impl BindTarget {
    /// Resolve `bind` (`host:port`, `localhost` included) to socket addresses
    pub(crate) async fn resolve(bind: &str) -> Result<Self> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(bind)
            .await
            .with_context(|| format!("Failed to resolve bind address: {bind}"))?
            .collect();
        if addrs.is_empty() {
            anyhow::bail!("Bind address {bind} resolved to no socket addresses");
        }
        log::debug!("Resolved {bind} to {addrs:?}");
        Ok(Self {
            bind: bind.to_string(),
            addrs,
        })
    }

    pub(crate) fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    /// Addresses other hosts could reach
    pub(crate) fn exposed(&self) -> Vec<SocketAddr> {
        self.addrs
            .iter()
            .copied()
            .filter(|addr| !addr.ip().is_loopback())
            .collect()
    }

    /// Keep the target only if it stays on loopback or `public` was passed
    pub(crate) fn authorize(self, public: bool) -> Result<Self> {
        let exposed = self.exposed();
        if !exposed.is_empty() && !public {
            anyhow::bail!(
                "Refusing to bind to non-loopback address without --public: {} ({}). Anyone who can reach it could delete or upload memes.",
                self.bind,
                join_addrs(&exposed)
            );
        }
        Ok(self)
    }
}

pub(crate) fn join_addrs(addrs: &[SocketAddr]) -> String {
    addrs
        .iter()
        .map(SocketAddr::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
