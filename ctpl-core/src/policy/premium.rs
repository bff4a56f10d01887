//! Derived premium amounts computed when a policy is created.

use serde::{Deserialize, Serialize};

/// Authentication fee charged when the request does not carry a usable one
pub const DEFAULT_AUTH_FEE: f64 = 50.40;

/// Documentary stamp tax rate on the basic premium
pub const DOC_STAMPS_RATE: f64 = 0.125;

/// Value-added tax rate on the basic premium
pub const E_VAT_RATE: f64 = 0.12;

/// Local government tax rate on the basic premium
pub const LGT_RATE: f64 = 0.005;

/// Taxes and total derived from a basic premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    pub doc_stamps: f64,
    pub e_vat: f64,
    pub lgt: f64,
    pub total_premium: f64,
}

impl PremiumBreakdown {
    /// Compute the derived amounts for a premium, other charges and auth fee.
    pub fn compute(premium: f64, other_charges: f64, auth_fee: f64) -> Self {
        let doc_stamps = premium * DOC_STAMPS_RATE;
        let e_vat = premium * E_VAT_RATE;
        let lgt = premium * LGT_RATE;
        let total_premium = premium + other_charges + doc_stamps + e_vat + lgt + auth_fee;

        Self {
            doc_stamps,
            e_vat,
            lgt,
            total_premium,
        }
    }
}
