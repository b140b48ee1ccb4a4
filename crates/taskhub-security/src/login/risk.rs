//! Risk-factor evaluation for failed-login attempts.
//!
//! Each factor is an independent boolean over the gathered signals; the
//! suspicion determination composes them. All counts include the attempt
//! being assessed, which is not yet persisted when evaluation runs, so
//! callers pass prior-row counts and the evaluator adds one.

use taskhub_core::config::security::SecurityConfig;
use taskhub_entity::login_attempt::risk::RiskFactor;

/// User agents shorter than this are treated as unusual.
const MIN_USER_AGENT_LEN: usize = 10;

/// Signals gathered for one failed attempt before it is persisted.
#[derive(Debug, Clone, Default)]
pub struct RiskSignals<'a> {
    /// Prior failed attempts for this identity inside the rapid window.
    pub prior_identity_attempts: u64,
    /// Distinct *other* identities attempted from this IP inside the
    /// multi-account window.
    pub other_identities_from_ip: u64,
    /// Prior attempts from this IP inside the IP-activity window.
    pub prior_ip_attempts: u64,
    /// Provider-reported suspicious-location flag.
    pub location_suspicious: bool,
    /// Provider-reported VPN/proxy flag.
    pub vpn_or_proxy: bool,
    /// The attempt's user agent.
    pub user_agent: Option<&'a str>,
}

/// The evaluated factor list and suspicion verdict for one attempt.
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    /// Factors present on this attempt.
    pub factors: Vec<RiskFactor>,
    /// Whether the attempt warrants review.
    pub suspicious: bool,
}

impl RiskAssessment {
    /// Factor labels in the stable stored form.
    pub fn labels(&self) -> Vec<String> {
        self.factors.iter().map(|f| f.label().to_string()).collect()
    }
}

/// Whether a user agent is absent or implausibly short.
pub fn is_unusual_user_agent(user_agent: Option<&str>) -> bool {
    match user_agent {
        None => true,
        Some(ua) => ua.trim().len() < MIN_USER_AGENT_LEN,
    }
}

/// Evaluate every risk factor and the suspicion verdict for one attempt.
///
/// Suspicion is monotone in the signals: adding a factor or raising a count
/// can never turn a suspicious attempt clean.
pub fn evaluate(signals: &RiskSignals<'_>, config: &SecurityConfig) -> RiskAssessment {
    let mut factors = Vec::new();

    if config
        .rapid_attempt_window()
        .is_met(signals.prior_identity_attempts + 1)
    {
        factors.push(RiskFactor::RapidAttempts);
    }

    if config
        .multi_account_window()
        .is_met(signals.other_identities_from_ip + 1)
    {
        factors.push(RiskFactor::MultipleAccounts);
    }

    if signals.location_suspicious {
        factors.push(RiskFactor::SuspiciousLocation);
    }

    if signals.vpn_or_proxy {
        factors.push(RiskFactor::VpnOrProxy);
    }

    if is_unusual_user_agent(signals.user_agent) {
        factors.push(RiskFactor::UnusualUserAgent);
    }

    let ip_activity_met = config
        .ip_activity_window()
        .is_met(signals.prior_ip_attempts + 1);

    let suspicious =
        factors.len() >= 2 || factors.iter().any(RiskFactor::is_critical) || ip_activity_met;

    RiskAssessment {
        factors,
        suspicious,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

    fn clean_signals() -> RiskSignals<'static> {
        RiskSignals {
            prior_identity_attempts: 0,
            other_identities_from_ip: 0,
            prior_ip_attempts: 0,
            location_suspicious: false,
            vpn_or_proxy: false,
            user_agent: Some(BROWSER_UA),
        }
    }

    #[test]
    fn test_clean_attempt_has_no_factors() {
        let assessment = evaluate(&clean_signals(), &SecurityConfig::default());
        assert!(assessment.factors.is_empty());
        assert!(!assessment.suspicious);
    }

    #[test]
    fn test_rapid_attempts_threshold_counts_current() {
        let config = SecurityConfig::default();
        let mut signals = clean_signals();

        // Two prior attempts plus this one meet the threshold of three.
        signals.prior_identity_attempts = 1;
        assert!(!evaluate(&signals, &config)
            .factors
            .contains(&RiskFactor::RapidAttempts));

        signals.prior_identity_attempts = 2;
        assert!(evaluate(&signals, &config)
            .factors
            .contains(&RiskFactor::RapidAttempts));
    }

    #[test]
    fn test_fifth_identity_from_ip_carries_multi_account_factor() {
        let config = SecurityConfig::default();
        let mut signals = clean_signals();

        // Four other identities plus this one reach five.
        signals.other_identities_from_ip = 3;
        let assessment = evaluate(&signals, &config);
        assert!(!assessment.factors.contains(&RiskFactor::MultipleAccounts));
        assert!(!assessment.suspicious);

        signals.other_identities_from_ip = 4;
        let assessment = evaluate(&signals, &config);
        assert!(assessment.factors.contains(&RiskFactor::MultipleAccounts));
        // The factor alone is enough to flag the attempt.
        assert!(assessment.suspicious);
    }

    #[test]
    fn test_vpn_alone_is_suspicious() {
        let mut signals = clean_signals();
        signals.vpn_or_proxy = true;
        let assessment = evaluate(&signals, &SecurityConfig::default());
        assert_eq!(assessment.factors, vec![RiskFactor::VpnOrProxy]);
        assert!(assessment.suspicious);
    }

    #[test]
    fn test_single_noncritical_factor_is_not_suspicious() {
        let mut signals = clean_signals();
        signals.location_suspicious = true;
        let assessment = evaluate(&signals, &SecurityConfig::default());
        assert_eq!(assessment.factors, vec![RiskFactor::SuspiciousLocation]);
        assert!(!assessment.suspicious);
    }

    #[test]
    fn test_two_factors_are_suspicious() {
        let mut signals = clean_signals();
        signals.location_suspicious = true;
        signals.user_agent = Some("curl/8");
        let assessment = evaluate(&signals, &SecurityConfig::default());
        assert_eq!(assessment.factors.len(), 2);
        assert!(assessment.suspicious);
    }

    #[test]
    fn test_busy_ip_is_suspicious_without_factors() {
        let mut signals = clean_signals();
        signals.prior_ip_attempts = 9;
        let assessment = evaluate(&signals, &SecurityConfig::default());
        assert!(assessment.factors.is_empty());
        assert!(assessment.suspicious);
    }

    #[test]
    fn test_unusual_user_agent_detection() {
        assert!(is_unusual_user_agent(None));
        assert!(is_unusual_user_agent(Some("")));
        assert!(is_unusual_user_agent(Some("curl/8")));
        assert!(!is_unusual_user_agent(Some(BROWSER_UA)));
    }

    #[test]
    fn test_suspicion_is_monotonic() {
        // Start from every signal combination that is already suspicious
        // and strengthen each signal in turn; the verdict must never flip.
        let config = SecurityConfig::default();
        let mut base = clean_signals();
        base.vpn_or_proxy = true;
        assert!(evaluate(&base, &config).suspicious);

        let strengthened: Vec<RiskSignals<'_>> = vec![
            RiskSignals {
                prior_identity_attempts: 10,
                ..base.clone()
            },
            RiskSignals {
                other_identities_from_ip: 10,
                ..base.clone()
            },
            RiskSignals {
                prior_ip_attempts: 100,
                ..base.clone()
            },
            RiskSignals {
                location_suspicious: true,
                ..base.clone()
            },
            RiskSignals {
                user_agent: None,
                ..base.clone()
            },
        ];

        for signals in &strengthened {
            let assessment = evaluate(signals, &config);
            assert!(
                assessment.suspicious,
                "strengthening signals flipped suspicion: {signals:?}"
            );
        }
    }
}
