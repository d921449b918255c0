//! Node configuration.
//!
//! Every option can be given as a flag or through the environment; a `.env`
//! file in the working directory is loaded before parsing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agentpay_core::{AgentPayError, PaymentTerms, Result};
use agentpay_executor::{
    CertificateMinter, HttpTaskExecutor, LocalTaskExecutor, MockCertificateMinter, TaskExecutor,
    MOCK_POLICY_ID,
};
use agentpay_ledger::{BlockfrostConfig, BlockfrostVerifier, InMemoryLedger, LedgerVerifier, PREPROD_BASE_URL};
use agentpay_state::RetentionPolicy;
use clap::{ArgAction, Args, Parser, ValueEnum};

/// Pay-per-task agent node.
#[derive(Debug, Clone, Parser)]
#[command(name = "agentpay-node", version, about = "Pay-per-task AI agent job service")]
pub struct NodeConfig {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub payment: PaymentArgs,

    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[command(flatten)]
    pub executor: ExecutorArgs,

    #[command(flatten)]
    pub certificate: CertificateArgs,

    #[command(flatten)]
    pub retention: RetentionArgs,
}

/// Parameters used to config the server.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// The host to listen on.
    #[arg(env = "AGENTPAY_HOST", long, default_value = "0.0.0.0")]
    pub host: String,

    /// The port to listen on.
    #[arg(env = "AGENTPAY_PORT", long, default_value_t = 8000)]
    pub port: u16,
}

/// What every job costs and where it is paid.
#[derive(Debug, Clone, Args)]
pub struct PaymentArgs {
    /// Address that must receive the payment.
    #[arg(env = "SELLER_ADDRESS", long)]
    pub seller_address: String,

    /// Required payment per job, in lovelace.
    #[arg(env = "PAYMENT_AMOUNT", long, default_value_t = 10_000_000)]
    pub payment_amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedgerBackend {
    /// Blockfrost REST API.
    Blockfrost,
    /// In-process ledger with no recorded transactions. Development only.
    Memory,
}

#[derive(Debug, Clone, Args)]
pub struct LedgerArgs {
    /// Ledger used to verify payments.
    #[arg(id = "ledger_backend", env = "LEDGER_BACKEND", long = "ledger", value_enum, default_value_t = LedgerBackend::Blockfrost)]
    pub backend: LedgerBackend,

    /// Blockfrost base URL.
    #[arg(env = "BLOCKFROST_BASE_URL", long, default_value = PREPROD_BASE_URL)]
    pub blockfrost_url: String,

    /// Blockfrost project id.
    #[arg(env = "BLOCKFROST_API_KEY", long)]
    pub blockfrost_api_key: Option<String>,

    /// Timeout of a single ledger lookup, in seconds.
    #[arg(env = "BLOCKFROST_TIMEOUT_SECONDS", long, default_value_t = 20)]
    pub blockfrost_timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutorBackend {
    /// Built-in text drafter.
    Local,
    /// External agent service.
    Http,
}

#[derive(Debug, Clone, Args)]
pub struct ExecutorArgs {
    /// Executor that runs paid tasks.
    #[arg(id = "executor_backend", env = "EXECUTOR_BACKEND", long = "executor", value_enum, default_value_t = ExecutorBackend::Local)]
    pub backend: ExecutorBackend,

    /// Endpoint of the agent service, required with `--executor http`.
    #[arg(env = "AGENT_SERVICE_URL", long)]
    pub agent_service_url: Option<String>,

    /// Deadline for one task, in seconds. Zero disables the deadline.
    #[arg(env = "EXECUTION_TIMEOUT_SECONDS", long, default_value_t = 300)]
    pub execution_timeout_seconds: u64,
}

#[derive(Debug, Clone, Args)]
pub struct CertificateArgs {
    /// Mint a certificate for every completed job.
    #[arg(env = "MINT_CERTIFICATES", long, default_value_t = true, action = ArgAction::Set)]
    pub mint_certificates: bool,

    /// Policy id stamped on certificates.
    #[arg(env = "MOCK_POLICY_ID", long, default_value = MOCK_POLICY_ID)]
    pub policy_id: String,

    /// Owner of issued certificates. Defaults to the purchaser ref.
    #[arg(env = "CERT_OWNER_ADDRESS", long)]
    pub cert_owner_address: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RetentionArgs {
    /// How long finished or abandoned jobs are kept, in seconds. Zero keeps them forever.
    #[arg(env = "JOB_RETENTION_SECONDS", long, default_value_t = 86_400)]
    pub job_retention_seconds: u64,

    /// How often expired jobs are swept, in seconds.
    #[arg(env = "SWEEP_INTERVAL_SECONDS", long, default_value_t = 60)]
    pub sweep_interval_seconds: u64,
}

fn config_error(message: impl Into<String>) -> AgentPayError {
    AgentPayError::Configuration(message.into())
}

impl NodeConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| config_error(format!("invalid listen address: {}", e)))
    }

    pub fn payment_terms(&self) -> Result<PaymentTerms> {
        PaymentTerms::new(self.payment.seller_address.trim(), self.payment.payment_amount)
    }

    pub fn execution_timeout(&self) -> Option<Duration> {
        match self.executor.execution_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            retention: Duration::from_secs(self.retention.job_retention_seconds),
            sweep_interval: Duration::from_secs(self.retention.sweep_interval_seconds.max(1)),
        }
    }

    pub fn ledger_verifier(&self) -> Result<Arc<dyn LedgerVerifier>> {
        match self.ledger.backend {
            LedgerBackend::Blockfrost => {
                let project_id = self
                    .ledger
                    .blockfrost_api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| config_error("BLOCKFROST_API_KEY is required for the blockfrost ledger"))?;

                let verifier = BlockfrostVerifier::new(BlockfrostConfig {
                    base_url: self.ledger.blockfrost_url.trim_end_matches('/').to_string(),
                    project_id,
                    timeout: Duration::from_secs(self.ledger.blockfrost_timeout_seconds),
                })?;
                Ok(Arc::new(verifier))
            }
            LedgerBackend::Memory => Ok(Arc::new(InMemoryLedger::new())),
        }
    }

    pub fn task_executor(&self) -> Result<Arc<dyn TaskExecutor>> {
        match self.executor.backend {
            ExecutorBackend::Local => Ok(Arc::new(LocalTaskExecutor::new())),
            ExecutorBackend::Http => {
                let endpoint = self
                    .executor
                    .agent_service_url
                    .clone()
                    .ok_or_else(|| config_error("AGENT_SERVICE_URL is required for the http executor"))?;
                // Requests share the task deadline; the orchestrator enforces it.
                let timeout = self.execution_timeout().unwrap_or(Duration::from_secs(3600));
                Ok(Arc::new(HttpTaskExecutor::new(endpoint, timeout)?))
            }
        }
    }

    pub fn certificate_minter(&self) -> Option<Arc<dyn CertificateMinter>> {
        self.certificate
            .mint_certificates
            .then(|| Arc::new(MockCertificateMinter::new(self.certificate.policy_id.clone())) as Arc<dyn CertificateMinter>)
    }
}
