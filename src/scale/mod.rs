//! Scale-barcode decoding.
//!
//! Weighing scales print EAN-13 barcodes that embed both a fixed item code
//! and the measured weight: a configured digit prefix marks the code as
//! scale-encoded, the first seven digits of the body identify the item, and
//! digits eight through twelve carry the weight with two implied fractional
//! digits.
//!
//! Two entry points share one parser. [`decode`] is lenient: a 13-digit code
//! with a wrong check digit still decodes, with the mismatch only logged,
//! so incremental typing gets early feedback. [`decode_strict`] is used when
//! the operator commits the input (Enter key, hardware scan terminator) and
//! rejects a wrong check digit outright.

use rust_decimal::Decimal;
use tracing::warn;

/// Digits in the item-code part of the barcode body.
const BASE_LEN: usize = 7;
/// A scale prefix longer than the item-code part can never match.
const MAX_PREFIX_LEN: usize = 7;
/// Length of the barcode body the check digit is computed over.
const BODY_LEN: usize = 12;

/// Result type for strict decoding.
pub type Result<T> = std::result::Result<T, ScaleError>;

/// Errors from the strict decoding path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScaleError {
    /// The declared EAN-13 check digit disagrees with the computed one.
    #[error("check digit mismatch: expected {expected}, found {found}")]
    CheckDigit { expected: u8, found: u8 },
}

/// A decoded scale barcode: fixed item-code base plus embedded quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleCode {
    /// First seven digits of the body; resolves to a catalog item.
    pub base: String,
    /// Embedded weight, two implied fractional digits.
    pub quantity: Decimal,
}

/// Compute the EAN-13 check digit over a 12-digit body.
///
/// Digits at even 0-based positions weigh 1, odd positions weigh 3; the
/// check digit brings the weighted sum up to a multiple of ten. Returns
/// `None` when `body` is not exactly 12 ASCII digits.
pub fn ean13_check_digit(body: &str) -> Option<u8> {
    if body.len() != BODY_LEN || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sum: u32 = body
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();
    let rem = sum % 10;
    Some(if rem == 0 { 0 } else { (10 - rem) as u8 })
}

struct Parsed {
    code: ScaleCode,
    /// Declared check digit, present only on 13-digit input.
    declared: Option<u8>,
    expected: u8,
}

/// Shared classification: prefix match, 12/13 digit shape, non-zero weight.
fn parse(raw: &str, prefix: &str) -> Option<Parsed> {
    if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN || !raw.starts_with(prefix) {
        return None;
    }
    if raw.len() != BODY_LEN && raw.len() != BODY_LEN + 1 {
        return None;
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let body = &raw[..BODY_LEN];
    let weight_block: i64 = body[BASE_LEN..].parse().ok()?;
    if weight_block <= 0 {
        return None;
    }

    Some(Parsed {
        code: ScaleCode {
            base: body[..BASE_LEN].to_string(),
            quantity: Decimal::new(weight_block, 2),
        },
        declared: (raw.len() == BODY_LEN + 1).then(|| raw.as_bytes()[BODY_LEN] - b'0'),
        expected: ean13_check_digit(body)?,
    })
}

/// Lenient decode: classify `raw` and extract `(base, quantity)`.
///
/// Returns `None` when `raw` is not a scale code for the given prefix. An
/// empty prefix disables scale decoding entirely. A 13-digit input with a
/// wrong check digit still decodes; the mismatch is logged.
pub fn decode(raw: &str, prefix: &str) -> Option<ScaleCode> {
    let parsed = parse(raw, prefix)?;
    if let Some(found) = parsed.declared {
        if found != parsed.expected {
            warn!(
                raw,
                expected = parsed.expected,
                found,
                "scale barcode check digit mismatch"
            );
        }
    }
    Some(parsed.code)
}

/// Strict decode: used when the operator commits the input.
///
/// Only a full 13-digit code with a matching check digit classifies as a
/// scale code here; a mismatch is a hard rejection. A 12-digit body falls
/// through to `Ok(None)` and is handled as plain search input.
pub fn decode_strict(raw: &str, prefix: &str) -> Result<Option<ScaleCode>> {
    let Some(parsed) = parse(raw, prefix) else {
        return Ok(None);
    };
    match parsed.declared {
        Some(found) if found != parsed.expected => Err(ScaleError::CheckDigit {
            expected: parsed.expected,
            found,
        }),
        Some(_) => Ok(Some(parsed.code)),
        None => Ok(None),
    }
}
