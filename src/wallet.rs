//! Wallet session shared by all mining targets.
//!
//! One session is created at startup and handed to every miner behind
//! an `Arc` — it is read-only from their side. The credential is either
//! a bech32 private key (recognised by its `suiprivkey` prefix) or a
//! seed phrase; the raw material lives in a `SecretString` and is never
//! logged.

use anyhow::{bail, Result};
use secrecy::SecretString;
use tracing::info;

use crate::types::MineCall;

/// How the configured credential should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    PrivateKey,
    SeedPhrase,
}

/// Wallet credential with its detected kind.
pub struct Credential {
    kind: CredentialKind,
    #[allow(dead_code)] // consumed by the signing backend once wired
    secret: SecretString,
}

impl Credential {
    /// Classify raw credential material.
    ///
    /// Values starting with `suiprivkey` are encoded private keys;
    /// anything else is treated as a seed phrase.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("wallet credential is empty — set the configured env var");
        }

        let kind = if trimmed.starts_with("suiprivkey") {
            CredentialKind::PrivateKey
        } else {
            CredentialKind::SeedPhrase
        };

        Ok(Self {
            kind,
            secret: SecretString::new(trimmed.to_string()),
        })
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }
}

/// Shared wallet session.
///
/// Owns the credential and the submission path for prepared mine calls.
pub struct Session {
    credential: Credential,
    dry_run: bool,
}

impl Session {
    pub fn connect(credential: Credential, dry_run: bool) -> Self {
        info!(
            credential = match credential.kind() {
                CredentialKind::PrivateKey => "private-key",
                CredentialKind::SeedPhrase => "seed-phrase",
            },
            dry_run,
            "Wallet session ready"
        );
        Self {
            credential,
            dry_run,
        }
    }

    /// Submit one prepared mine call.
    ///
    /// In dry-run mode the call is logged and reported as successful.
    // TODO: wire the transaction signing backend for live submission.
    pub async fn execute_mine(&self, call: &MineCall) -> Result<()> {
        if self.dry_run {
            info!(call = %call, "[DRY RUN] Would submit mine transaction");
            return Ok(());
        }

        bail!(
            "live submission with {:?} credential requires the signing backend; run with dry_run = true",
            self.credential.kind()
        )
    }
}
