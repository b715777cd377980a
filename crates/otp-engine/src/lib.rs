//! One-time code engine.
//!
//! Gates sensitive actions behind a short-lived six-digit code delivered
//! out of band. The engine owns the whole lifecycle: generation, delivery,
//! a one-second countdown, verification and expiry. Requesting a new code
//! always invalidates the previous one, whatever state it was in.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Seconds a delivered code stays valid.
pub const CODE_TTL_SECS: u64 = 300;

const CODE_MIN: u32 = 100_000;
const CODE_MAX_EXCLUSIVE: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    Login,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPhase {
    Idle,
    Sent,
    Verified,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Out-of-band transport for issued codes.
pub trait CodeDelivery: Send + Sync {
    fn deliver(
        &self,
        destination: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), DeliveryError>;
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum OtpError {
    #[error("no code is pending verification")]
    NotPending,
    #[error("code does not match")]
    CodeMismatch,
    #[error("code has expired")]
    Expired,
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// A fresh six-digit code drawn uniformly from 100000..=999999.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(CODE_MIN..CODE_MAX_EXCLUSIVE).to_string()
}

struct EngineInner {
    phase: OtpPhase,
    purpose: Option<OtpPurpose>,
    code: Option<String>,
    remaining_secs: u64,
    ticker: Option<CancellationToken>,
}

/// Owns one code lifecycle at a time.
///
/// Dropping the engine cancels any running countdown.
pub struct OtpEngine {
    inner: Arc<Mutex<EngineInner>>,
    delivery: Arc<dyn CodeDelivery>,
    teardown: CancellationToken,
}

impl OtpEngine {
    pub fn new(delivery: Arc<dyn CodeDelivery>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner {
                phase: OtpPhase::Idle,
                purpose: None,
                code: None,
                remaining_secs: 0,
                ticker: None,
            })),
            delivery,
            teardown: CancellationToken::new(),
        }
    }

    /// Issue and deliver a fresh code.
    ///
    /// Must be called inside a tokio runtime; the countdown runs as a
    /// spawned task. A delivery failure is reported to the caller but the
    /// code stays live, so verification and resends still work.
    pub fn request(&self, destination: &str, purpose: OtpPurpose) -> Result<(), OtpError> {
        self.request_with_rng(destination, purpose, &mut OsRng)
    }

    pub fn request_with_rng<R: Rng + ?Sized>(
        &self,
        destination: &str,
        purpose: OtpPurpose,
        rng: &mut R,
    ) -> Result<(), OtpError> {
        let code = generate_code(rng);
        let ticker = {
            let mut inner = self.lock();
            if let Some(previous) = inner.ticker.take() {
                previous.cancel();
            }
            inner.phase = OtpPhase::Sent;
            inner.purpose = Some(purpose);
            inner.code = Some(code.clone());
            inner.remaining_secs = CODE_TTL_SECS;
            let ticker = self.teardown.child_token();
            inner.ticker = Some(ticker.clone());
            ticker
        };
        self.spawn_countdown(ticker);
        tracing::info!(?purpose, "one-time code issued");
        if let Err(e) = self.delivery.deliver(destination, &code, purpose) {
            tracing::warn!(error = %e, "code delivery failed, code stays live for resend");
            return Err(e.into());
        }
        Ok(())
    }

    /// Check a candidate against the live code.
    ///
    /// A match consumes the code and stops the countdown. A mismatch
    /// leaves the code live so the user can retry until expiry.
    pub fn verify(&self, candidate: &str) -> Result<(), OtpError> {
        let mut inner = self.lock();
        match inner.phase {
            OtpPhase::Sent => {}
            OtpPhase::Expired => return Err(OtpError::Expired),
            OtpPhase::Idle | OtpPhase::Verified => return Err(OtpError::NotPending),
        }
        let Some(code) = inner.code.as_deref() else {
            return Err(OtpError::Expired);
        };
        if code != candidate.trim() {
            tracing::warn!("one-time code mismatch");
            return Err(OtpError::CodeMismatch);
        }
        inner.phase = OtpPhase::Verified;
        inner.code = None;
        inner.remaining_secs = 0;
        if let Some(ticker) = inner.ticker.take() {
            ticker.cancel();
        }
        tracing::info!("one-time code verified");
        Ok(())
    }

    /// Resend is allowed exactly when the countdown stands at zero.
    pub fn can_resend(&self) -> bool {
        self.lock().remaining_secs == 0
    }

    pub fn phase(&self) -> OtpPhase {
        self.lock().phase
    }

    pub fn purpose(&self) -> Option<OtpPurpose> {
        self.lock().purpose
    }

    pub fn remaining_secs(&self) -> u64 {
        self.lock().remaining_secs
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_countdown(&self, ticker: CancellationToken) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = ticker.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(1)) => {}
                }
                let mut state = inner.lock().unwrap_or_else(PoisonError::into_inner);
                if state.phase != OtpPhase::Sent {
                    break;
                }
                state.remaining_secs = state.remaining_secs.saturating_sub(1);
                if state.remaining_secs == 0 {
                    state.phase = OtpPhase::Expired;
                    state.code = None;
                    state.ticker = None;
                    tracing::info!("one-time code expired");
                    break;
                }
            }
        });
    }
}

impl Drop for OtpEngine {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
