use dpg_common::Kobo;
use thiserror::Error;

/// 90% to the seller, 10% platform commission.
pub const DEFAULT_SELLER_SHARE_BPS: u32 = 9_000;

#[derive(Debug, Clone, Error)]
pub enum SplitError {
    #[error("Seller share must be at most 10000 basis points, got {0}")]
    ShareOutOfRange(u32),
}

/// How a line total is divided between the seller and the platform.
///
/// The seller's cut is `amount * bps / 10000`, rounded down; the platform receives the remainder, so the two cuts
/// always sum to the original amount to the kobo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    seller_share_bps: u32,
}

impl Default for FeeSplit {
    fn default() -> Self {
        Self { seller_share_bps: DEFAULT_SELLER_SHARE_BPS }
    }
}

impl FeeSplit {
    pub fn new(seller_share_bps: u32) -> Result<Self, SplitError> {
        if seller_share_bps > 10_000 {
            return Err(SplitError::ShareOutOfRange(seller_share_bps));
        }
        Ok(Self { seller_share_bps })
    }

    pub fn seller_share_bps(&self) -> u32 {
        self.seller_share_bps
    }

    pub fn seller_cut(&self, amount: Kobo) -> Kobo {
        Kobo::from(amount.value() * i64::from(self.seller_share_bps) / 10_000)
    }

    pub fn platform_cut(&self, amount: Kobo) -> Kobo {
        amount - self.seller_cut(amount)
    }
}
