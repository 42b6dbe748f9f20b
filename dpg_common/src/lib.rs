mod kobo;

pub mod op;
mod secret;

pub use kobo::{Kobo, KoboConversionError, NGN_CURRENCY_CODE, NGN_CURRENCY_CODE_LOWER};
pub use secret::Secret;
