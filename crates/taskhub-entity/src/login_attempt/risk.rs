//! Risk factors attached to failed-login attempts.

use serde::{Deserialize, Serialize};

/// One qualitative, independently-evaluated risk signal.
///
/// The string forms are stored on attempt rows and surfaced in reports, so
/// they are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// Three or more failed attempts for the same identity inside the
    /// rapid-attempt window.
    RapidAttempts,
    /// The source IP targeted several distinct identities recently.
    MultipleAccounts,
    /// The provider flagged the IP's location as suspicious.
    SuspiciousLocation,
    /// The provider flagged the IP as a VPN exit or proxy.
    VpnOrProxy,
    /// The user agent is absent or implausibly short.
    UnusualUserAgent,
}

impl RiskFactor {
    /// Stable human-readable label stored with the attempt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RapidAttempts => "Rapid successive attempts",
            Self::MultipleAccounts => "Multiple accounts targeted from same IP",
            Self::SuspiciousLocation => "Suspicious geolocation",
            Self::VpnOrProxy => "VPN or proxy detected",
            Self::UnusualUserAgent => "Unusual or missing user agent",
        }
    }

    /// Factors whose presence alone makes an attempt suspicious.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::MultipleAccounts | Self::VpnOrProxy)
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_distinct() {
        let all = [
            RiskFactor::RapidAttempts,
            RiskFactor::MultipleAccounts,
            RiskFactor::SuspiciousLocation,
            RiskFactor::VpnOrProxy,
            RiskFactor::UnusualUserAgent,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.label(), b.label());
            }
        }
    }

    #[test]
    fn test_critical_factors() {
        assert!(RiskFactor::MultipleAccounts.is_critical());
        assert!(RiskFactor::VpnOrProxy.is_critical());
        assert!(!RiskFactor::RapidAttempts.is_critical());
        assert!(!RiskFactor::SuspiciousLocation.is_critical());
        assert!(!RiskFactor::UnusualUserAgent.is_critical());
    }
}
