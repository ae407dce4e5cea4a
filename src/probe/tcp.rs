// src/probe/tcp.rs
use super::{decode_config, Probe, ProbeError};
use crate::check::CheckDefinition;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::net::TcpStream;

/// Healthy when a TCP connection to `address:port` can be established.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TcpProbe {
    pub port: u16,

    #[serde(skip)]
    address: String,
}

impl TcpProbe {
    pub fn from_check(check: &CheckDefinition) -> Result<Self, ProbeError> {
        decode_config(&check.config)
    }

    fn target(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[async_trait]
impl Probe for TcpProbe {
    fn apply_defaults(&mut self, check: &CheckDefinition) {
        self.address = check.address.clone();
    }

    fn validate(&self) -> Result<(), ProbeError> {
        if self.port == 0 {
            return Err(ProbeError::MissingPort);
        }
        Ok(())
    }

    async fn execute(&self) -> Result<(), ProbeError> {
        let addr = self.target();
        let stream = TcpStream::connect(addr.as_str())
            .await
            .map_err(|source| ProbeError::Connect {
                addr: addr.clone(),
                source,
            })?;

        tracing::debug!(%addr, peer = ?stream.peer_addr().ok(), "tcp probe connected");
        Ok(())
    }
}
