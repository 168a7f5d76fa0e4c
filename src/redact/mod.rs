// ABOUTME: Secret redaction and text shortening applied to everything that
// ABOUTME: leaves the engine through traces, messages, or logs.

mod filter;
mod text;

pub use filter::{MIN_SECRET_LEN, RedactionFilter};
pub use text::{ELLIPSIS, preview, truncate};
