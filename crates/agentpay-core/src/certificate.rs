//! Completion certificates.
//!
//! A certificate is the receipt issued after a job completes. It binds the
//! job id to a digest of the delivered output so the holder can later show
//! which result they paid for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::job::JobId;
use crate::types::TaskOutput;

/// Everything a minter needs to issue a certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRequest {
    /// The completed job.
    pub job_id: JobId,

    /// Address that will hold the certificate.
    pub owner: String,

    /// Purchaser reference recorded in the metadata.
    pub purchaser_ref: String,

    /// The delivered output.
    pub output: TaskOutput,
}

impl CertificateRequest {
    /// Name of the certificate asset for this job.
    pub fn asset_name(&self) -> String {
        format!("Certificate-{}", self.job_id)
    }

    /// Metadata recorded alongside the certificate.
    pub fn metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "job_id": self.job_id,
            "identifier": self.purchaser_ref,
            "task_type": self.output.task_type,
        })
    }

    /// SHA-256 over the job id and delivered content, hex-encoded.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.job_id, &self.output)
    }
}

/// An issued certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// Minting policy the asset belongs to.
    pub policy_id: String,

    /// Asset name, unique per job.
    pub asset_name: String,

    /// Holder address.
    pub owner: String,

    /// Digest of job id and output.
    pub fingerprint: String,

    /// Free-form metadata.
    pub metadata: serde_json::Value,

    /// When the certificate was issued.
    pub issued_at: DateTime<Utc>,
}

impl Certificate {
    /// Fully qualified asset id, `policy.asset`.
    pub fn asset_id(&self) -> String {
        format!("{}.{}", self.policy_id, self.asset_name)
    }

    /// Check the fingerprint against a job's output.
    pub fn matches(&self, job_id: &JobId, output: &TaskOutput) -> bool {
        self.fingerprint == fingerprint(job_id, output)
    }
}

fn fingerprint(job_id: &JobId, output: &TaskOutput) -> String {
    let mut hasher = Sha256::new();
    hasher.update(job_id.0.as_bytes());
    hasher.update(output.task_type.as_str().as_bytes());
    hasher.update(output.content.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
