use crate::translation::TranslationResult;

/// Running cost of a chat session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostLedger {
    total_usd: f64,
    priced: u32,
    unpriced: u32,
}

impl CostLedger {
    /// Counts a successful translation; failures cost nothing.
    pub fn record(&mut self, result: &TranslationResult) {
        if let TranslationResult::Success { cost_usd, .. } = result {
            match cost_usd {
                Some(cost) => {
                    self.total_usd += cost;
                    self.priced += 1;
                }
                None => self.unpriced += 1,
            }
        }
    }

    /// Sum of all known costs.
    pub const fn total_usd(&self) -> f64 {
        self.total_usd
    }

    pub const fn priced(&self) -> u32 {
        self.priced
    }

    /// Translations whose cost could not be determined.
    pub const fn unpriced(&self) -> u32 {
        self.unpriced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::FailureKind;

    fn success(cost_usd: Option<f64>) -> TranslationResult {
        TranslationResult::Success {
            destination_text: "ok".to_string(),
            cost_usd,
            usage: None,
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_ledger_sums_known_costs() {
        let mut ledger = CostLedger::default();
        ledger.record(&success(Some(0.25)));
        ledger.record(&success(Some(0.5)));
        ledger.record(&success(None));
        ledger.record(&TranslationResult::Error {
            kind: FailureKind::Network,
            message: "network error: reset".to_string(),
        });

        assert_eq!(ledger.total_usd(), 0.75);
        assert_eq!(ledger.priced(), 2);
        assert_eq!(ledger.unpriced(), 1);
    }
}
