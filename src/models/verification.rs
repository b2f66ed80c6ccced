//! Verification settings for a company: the outbound sender identity, the
//! custom sending domain, and the three prevention steps.
//!
//! The stored row is typed end to end. `prevention_steps` and
//! `domain_dns_records` are JSON columns, but they always round-trip through
//! [`PreventionSteps`] and [`DnsRecord`], and the row carries a
//! `schema_version` so an unknown layout is rejected on read instead of
//! being papered over with defaults.

use serde::{Deserialize, Serialize};

/// Layout version written into every settings row.
pub const SETTINGS_SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreventionSteps {
    pub step1: bool,
    pub step2: bool,
    pub step3: bool,
}

/// One DNS record the tenant must publish to authenticate its domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DnsRecord {
    /// Upstream key for the record, e.g. `dkim_record` or `brevo_code`.
    pub name: String,
    pub record_type: String,
    pub host_name: String,
    pub value: String,
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationSettings {
    pub company_id: i64,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub sender_id: Option<String>,
    pub is_verified: bool,
    pub pending_sender_id: Option<String>,
    pub pending_sender_email: Option<String>,
    pub pending_sender_name: Option<String>,
    pub prevention_steps: PreventionSteps,
    pub domain: Option<String>,
    pub domain_brevo_id: Option<String>,
    pub domain_dns_records: Vec<DnsRecord>,
}

impl VerificationSettings {
    /// Settings of a company that never touched the verification flow.
    pub fn empty(company_id: i64) -> Self {
        Self {
            company_id,
            sender_name: None,
            sender_email: None,
            sender_id: None,
            is_verified: false,
            pending_sender_id: None,
            pending_sender_email: None,
            pending_sender_name: None,
            prevention_steps: PreventionSteps::default(),
            domain: None,
            domain_brevo_id: None,
            domain_dns_records: Vec::new(),
        }
    }

    pub fn has_sender(&self) -> bool {
        self.sender_id.is_some()
    }

    pub fn has_pending_sender(&self) -> bool {
        self.pending_sender_id.is_some()
    }

    /// Merge `patch` into these settings. Fields the patch leaves as `None`
    /// keep their current value.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(value) = patch.sender_name {
            self.sender_name = value;
        }
        if let Some(value) = patch.sender_email {
            self.sender_email = value;
        }
        if let Some(value) = patch.sender_id {
            self.sender_id = value;
        }
        if let Some(value) = patch.is_verified {
            self.is_verified = value;
        }
        if let Some(value) = patch.pending_sender_id {
            self.pending_sender_id = value;
        }
        if let Some(value) = patch.pending_sender_email {
            self.pending_sender_email = value;
        }
        if let Some(value) = patch.pending_sender_name {
            self.pending_sender_name = value;
        }
        if let Some(value) = patch.step1 {
            self.prevention_steps.step1 = value;
        }
        if let Some(value) = patch.step2 {
            self.prevention_steps.step2 = value;
        }
        if let Some(value) = patch.step3 {
            self.prevention_steps.step3 = value;
        }
        if let Some(value) = patch.domain {
            self.domain = value;
        }
        if let Some(value) = patch.domain_brevo_id {
            self.domain_brevo_id = value;
        }
        if let Some(value) = patch.domain_dns_records {
            self.domain_dns_records = value;
        }
        self.normalize();
    }

    /// A verified sender always counts as prevention step 1.
    pub fn normalize(&mut self) {
        if self.is_verified {
            self.prevention_steps.step1 = true;
        }
    }
}

/// Partial update for [`VerificationSettings`].
///
/// For nullable columns the outer `Option` selects "keep" (`None`) versus
/// "write" (`Some`), and `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub sender_name: Option<Option<String>>,
    pub sender_email: Option<Option<String>>,
    pub sender_id: Option<Option<String>>,
    pub is_verified: Option<bool>,
    pub pending_sender_id: Option<Option<String>>,
    pub pending_sender_email: Option<Option<String>>,
    pub pending_sender_name: Option<Option<String>>,
    pub step1: Option<bool>,
    pub step2: Option<bool>,
    pub step3: Option<bool>,
    pub domain: Option<Option<String>>,
    pub domain_brevo_id: Option<Option<String>>,
    pub domain_dns_records: Option<Vec<DnsRecord>>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly created, not yet verified sender.
    pub fn sender(mut self, id: &str, email: &str, name: &str) -> Self {
        self.sender_id = Some(Some(id.to_string()));
        self.sender_email = Some(Some(email.to_string()));
        self.sender_name = Some(Some(name.to_string()));
        self.is_verified = Some(false);
        self
    }

    pub fn pending_sender(mut self, id: &str, email: &str, name: &str) -> Self {
        self.pending_sender_id = Some(Some(id.to_string()));
        self.pending_sender_email = Some(Some(email.to_string()));
        self.pending_sender_name = Some(Some(name.to_string()));
        self
    }

    pub fn clear_pending_sender(mut self) -> Self {
        self.pending_sender_id = Some(None);
        self.pending_sender_email = Some(None);
        self.pending_sender_name = Some(None);
        self
    }

    pub fn verified(mut self) -> Self {
        self.is_verified = Some(true);
        self.step1 = Some(true);
        self
    }

    pub fn domain(mut self, domain: &str, brevo_id: Option<&str>, records: Vec<DnsRecord>) -> Self {
        self.domain = Some(Some(domain.to_string()));
        self.domain_brevo_id = Some(brevo_id.map(str::to_string));
        self.domain_dns_records = Some(records);
        self
    }

    pub fn step(mut self, step: u8, done: bool) -> Self {
        match step {
            1 => self.step1 = Some(done),
            2 => self.step2 = Some(done),
            3 => self.step3 = Some(done),
            _ => {}
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SenderState {
    NoSender,
    PendingOtp,
    Verified { update_pending: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainState {
    NoDomain,
    PendingDns,
    Authenticated,
}

/// Workflow position derived from stored settings plus the live domain check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerificationProgress {
    pub sender: SenderState,
    pub domain: DomainState,
    pub prevention_steps: PreventionSteps,
}

impl VerificationProgress {
    /// `domain_authenticated` must come from a live check. The stored step2
    /// flag is never trusted on its own since the domain may have been
    /// reconfigured after it was written.
    pub fn derive(settings: &VerificationSettings, domain_authenticated: bool) -> Self {
        let sender = match (settings.has_sender(), settings.is_verified) {
            (false, _) => SenderState::NoSender,
            (true, false) => SenderState::PendingOtp,
            (true, true) => SenderState::Verified {
                update_pending: settings.has_pending_sender(),
            },
        };

        let domain_authenticated = settings.domain.is_some() && domain_authenticated;
        let domain = match (settings.domain.is_some(), domain_authenticated) {
            (false, _) => DomainState::NoDomain,
            (true, false) => DomainState::PendingDns,
            (true, true) => DomainState::Authenticated,
        };

        let prevention_steps = PreventionSteps {
            step1: settings.prevention_steps.step1 || settings.is_verified,
            step2: domain_authenticated,
            step3: settings.prevention_steps.step3,
        };

        Self {
            sender,
            domain,
            prevention_steps,
        }
    }
}
