//! Certificate minting hook.

use async_trait::async_trait;
use agentpay_core::{AgentPayError, Certificate, CertificateRequest, Result};
use chrono::Utc;
use tracing::info;

/// Default policy id of the mock minter.
pub const MOCK_POLICY_ID: &str = "mockpolicy1234567890";

/// Issues a certificate for a completed job.
#[async_trait]
pub trait CertificateMinter: Send + Sync {
    /// Mint a certificate described by `request`.
    async fn mint(&self, request: CertificateRequest) -> Result<Certificate>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Minter that records certificates without touching a chain.
#[derive(Debug, Clone)]
pub struct MockCertificateMinter {
    policy_id: String,
}

impl MockCertificateMinter {
    pub fn new(policy_id: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
        }
    }
}

impl Default for MockCertificateMinter {
    fn default() -> Self {
        Self::new(MOCK_POLICY_ID)
    }
}

#[async_trait]
impl CertificateMinter for MockCertificateMinter {
    async fn mint(&self, request: CertificateRequest) -> Result<Certificate> {
        if request.owner.trim().is_empty() {
            return Err(AgentPayError::Minting("certificate owner is empty".to_string()));
        }

        let certificate = Certificate {
            policy_id: self.policy_id.clone(),
            asset_name: request.asset_name(),
            owner: request.owner.clone(),
            fingerprint: request.fingerprint(),
            metadata: request.metadata(),
            issued_at: Utc::now(),
        };

        info!(
            asset = %certificate.asset_id(),
            owner = %certificate.owner,
            "(mock) Minted certificate"
        );

        Ok(certificate)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
