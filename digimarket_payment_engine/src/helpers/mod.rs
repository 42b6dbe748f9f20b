mod ids;
mod split;

pub use ids::{new_order_number, new_payment_reference};
pub use split::{FeeSplit, SplitError, DEFAULT_SELLER_SHARE_BPS};
