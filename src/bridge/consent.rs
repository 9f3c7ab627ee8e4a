//! Operator consent for privileged runs
//!
//! Before anything is elevated the operator sees why administrator access
//! is needed and answers yes or no. A "no" stops the run before any
//! process or OS dialog exists.

use std::io::{BufRead, Write};

/// Outcome of the consent step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentDecision {
    Accepted,
    Declined,
}

impl ConsentDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ConsentDecision::Accepted)
    }
}

/// Asks the operator whether a privileged run may proceed
#[async_trait::async_trait]
pub trait ConsentPrompt: Send + Sync {
    /// Present `reason` and return the operator's decision
    async fn confirm(&self, reason: &str) -> ConsentDecision;
}

/// Always answers the same way (`--yes` on the command line, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedConsent(pub ConsentDecision);

impl FixedConsent {
    pub fn accept() -> Self {
        Self(ConsentDecision::Accepted)
    }

    pub fn decline() -> Self {
        Self(ConsentDecision::Declined)
    }
}

#[async_trait::async_trait]
impl ConsentPrompt for FixedConsent {
    async fn confirm(&self, reason: &str) -> ConsentDecision {
        debug!("Consent for '{}' answered automatically: {:?}", reason, self.0);
        self.0
    }
}

/// Prompts on the controlling terminal (stderr for the question, stdin for the answer)
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConsent;

impl TerminalConsent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ConsentPrompt for TerminalConsent {
    async fn confirm(&self, reason: &str) -> ConsentDecision {
        let reason = reason.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}", reason);
            let _ = write!(stderr, "Administrator access is required. Continue? [y/N] ");
            let _ = stderr.flush();

            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(_) => line,
                Err(e) => {
                    warn!("Failed to read consent answer: {}", e);
                    String::new()
                }
            }
        })
        .await
        .unwrap_or_default();

        parse_answer(&answer)
    }
}

/// Only an explicit yes counts; anything else (including EOF) declines
pub fn parse_answer(answer: &str) -> ConsentDecision {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => ConsentDecision::Accepted,
        _ => ConsentDecision::Declined,
    }
}
