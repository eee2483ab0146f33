//! Fee schedules and fee strategies
//!
//! Every asset carries a fee schedule for the three operations that move it:
//! trade, exchange and transfer. Each schedule is a fixed amount plus a
//! fraction of the moved value. Fractions come in as text and are held as
//! reduced `u64` rationals so two spellings of the same value encode
//! identically.

use crate::error::{AssetAsmError, Result};
use crate::serialization::{ByteSerialize, FieldCursor, SegmentWriter};
use rust_decimal::Decimal;
use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Which party pays the protocol fees of an exchange or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FeeStrategy {
    /// The receiving side pays.
    Recipient,
    /// The sending side pays.
    Sender,
    /// Both sides pay half.
    RecipientAndSender,
    /// The intermediary pays.
    Intermediary,
}

impl FeeStrategy {
    pub fn as_u8(self) -> u8 {
        match self {
            FeeStrategy::Recipient => 1,
            FeeStrategy::Sender => 2,
            FeeStrategy::RecipientAndSender => 3,
            FeeStrategy::Intermediary => 4,
        }
    }
}

impl TryFrom<u8> for FeeStrategy {
    type Error = AssetAsmError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(FeeStrategy::Recipient),
            2 => Ok(FeeStrategy::Sender),
            3 => Ok(FeeStrategy::RecipientAndSender),
            4 => Ok(FeeStrategy::Intermediary),
            other => Err(AssetAsmError::invalid_argument(
                "fee_strategy",
                format!("unknown value {}", other),
            )),
        }
    }
}

impl From<FeeStrategy> for u8 {
    fn from(strategy: FeeStrategy) -> u8 {
        strategy.as_u8()
    }
}

impl ByteSerialize for FeeStrategy {
    const SIZE: usize = 1;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_u8(at, self.as_u8())
    }
}

/// Non-negative rational in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: u64,
    denominator: u64,
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn bad_fraction(text: &str, reason: &str) -> AssetAsmError {
    AssetAsmError::invalid_argument("fraction", format!("{:?} {}", text, reason))
}

impl Fraction {
    /// Build a fraction from numerator and denominator, reducing it.
    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        Self::reduce(numerator as u128, denominator as u128)
    }

    pub fn zero() -> Self {
        Fraction {
            numerator: 0,
            denominator: 1,
        }
    }

    fn reduce(numerator: u128, denominator: u128) -> Result<Self> {
        if denominator == 0 {
            return Err(AssetAsmError::invalid_argument(
                "fraction",
                "denominator must be non-zero",
            ));
        }
        let divisor = gcd(numerator, denominator);
        let numerator = u64::try_from(numerator / divisor);
        let denominator = u64::try_from(denominator / divisor);
        match (numerator, denominator) {
            (Ok(numerator), Ok(denominator)) => Ok(Fraction {
                numerator,
                denominator,
            }),
            _ => Err(AssetAsmError::invalid_argument(
                "fraction",
                "value does not fit in u64 terms",
            )),
        }
    }

    /// Parse `"0.25"`, `".25"`, `"3"` or `"1/4"`.
    pub fn parse(text: &str) -> Result<Self> {
        match text.split_once('/') {
            Some((numerator, denominator)) => Self::parse_ratio(text, numerator, denominator),
            None => Self::parse_decimal(text),
        }
    }

    fn parse_ratio(text: &str, numerator: &str, denominator: &str) -> Result<Self> {
        if !is_digits(numerator) || !is_digits(denominator) {
            return Err(bad_fraction(text, "is not a ratio of unsigned integers"));
        }
        let numerator: u64 = numerator
            .parse()
            .map_err(|_| bad_fraction(text, "numerator out of range"))?;
        let denominator: u64 = denominator
            .parse()
            .map_err(|_| bad_fraction(text, "denominator out of range"))?;
        Self::new(numerator, denominator)
    }

    fn parse_decimal(text: &str) -> Result<Self> {
        let (whole, fractional) = match text.split_once('.') {
            Some((whole, fractional)) => (whole, Some(fractional)),
            None => (text, None),
        };

        let whole_ok = whole.is_empty() || is_digits(whole);
        let fractional_ok = fractional.map_or(true, is_digits);
        if !whole_ok || !fractional_ok || (whole.is_empty() && fractional.is_none()) {
            return Err(bad_fraction(text, "is not an unsigned decimal"));
        }

        // Padding zeros carry no value but count against the 28-digit limit.
        let whole = whole.trim_start_matches('0');
        let fractional = fractional.map_or("", |f| f.trim_end_matches('0'));
        let normalized = match (whole.is_empty(), fractional.is_empty()) {
            (true, true) => "0".to_string(),
            (true, false) => format!("0.{}", fractional),
            (false, true) => whole.to_string(),
            (false, false) => format!("{}.{}", whole, fractional),
        };
        let decimal = Decimal::from_str_exact(&normalized)
            .map_err(|e| bad_fraction(text, &e.to_string()))?;
        let mantissa = u128::try_from(decimal.mantissa())
            .map_err(|_| bad_fraction(text, "is negative"))?;
        let denominator = 10u128.pow(decimal.scale());
        Self::reduce(mantissa, denominator)
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Fraction {
    type Err = AssetAsmError;

    fn from_str(text: &str) -> Result<Self> {
        Fraction::parse(text)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl Serialize for Fraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fraction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Fraction::parse(&text).map_err(de::Error::custom)
    }
}

impl ByteSerialize for Fraction {
    const SIZE: usize = 16;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        if self.denominator == 0 {
            return Err(AssetAsmError::EncodingError(
                "fraction with zero denominator".to_string(),
            ));
        }
        writer.put_u64(at, self.numerator)?;
        writer.put_u64(at + 8, self.denominator)
    }
}

/// Fixed amount plus a fraction of the moved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
pub struct Fee {
    pub fixed: u64,
    pub fraction: Fraction,
}

impl Fee {
    pub fn new(fixed: u64, fraction: Fraction) -> Self {
        Self { fixed, fraction }
    }

    /// Fee with its fraction given as text.
    pub fn parse(fixed: u64, fraction: &str) -> Result<Self> {
        Ok(Self::new(fixed, Fraction::parse(fraction)?))
    }
}

impl ByteSerialize for Fee {
    const SIZE: usize = 24;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(at);
        cursor.field(writer, &self.fixed)?;
        cursor.field(writer, &self.fraction)
    }
}

/// Per-operation fee schedule attached to an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
pub struct Fees {
    pub trade: Fee,
    pub exchange: Fee,
    pub transfer: Fee,
}

impl Fees {
    pub fn new(trade: Fee, exchange: Fee, transfer: Fee) -> Self {
        Self {
            trade,
            exchange,
            transfer,
        }
    }

    /// Build from three `(fixed, fraction text)` pairs.
    pub fn parse(
        trade_fixed: u64,
        trade_fraction: &str,
        exchange_fixed: u64,
        exchange_fraction: &str,
        transfer_fixed: u64,
        transfer_fraction: &str,
    ) -> Result<Self> {
        Ok(Self::new(
            Fee::parse(trade_fixed, trade_fraction)?,
            Fee::parse(exchange_fixed, exchange_fraction)?,
            Fee::parse(transfer_fixed, transfer_fraction)?,
        ))
    }

    pub fn builder() -> FeesBuilder {
        FeesBuilder::new()
    }
}

impl ByteSerialize for Fees {
    const SIZE: usize = 72;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(at);
        cursor.field(writer, &self.trade)?;
        cursor.field(writer, &self.exchange)?;
        cursor.field(writer, &self.transfer)
    }
}

/// Fluent construction of `Fees`; every operation must be set.
#[derive(Debug, Default)]
pub struct FeesBuilder {
    trade: Option<Fee>,
    exchange: Option<Fee>,
    transfer: Option<Fee>,
}

impl FeesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trade(mut self, fixed: u64, fraction: Fraction) -> Self {
        self.trade = Some(Fee::new(fixed, fraction));
        self
    }

    pub fn exchange(mut self, fixed: u64, fraction: Fraction) -> Self {
        self.exchange = Some(Fee::new(fixed, fraction));
        self
    }

    pub fn transfer(mut self, fixed: u64, fraction: Fraction) -> Self {
        self.transfer = Some(Fee::new(fixed, fraction));
        self
    }

    pub fn build(self) -> Result<Fees> {
        let missing = |name: &str| AssetAsmError::invalid_argument(name, "fee not set");
        Ok(Fees::new(
            self.trade.ok_or_else(|| missing("trade"))?,
            self.exchange.ok_or_else(|| missing("exchange"))?,
            self.transfer.ok_or_else(|| missing("transfer"))?,
        ))
    }
}
