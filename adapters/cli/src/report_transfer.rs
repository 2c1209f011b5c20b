#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use starhold_core::BattleReport;

const TRANSFER_DOMAIN: &str = "battle";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded report payload.
pub(crate) const TRANSFER_HEADER: &str = "battle:v1";
/// Delimiter used to separate the prefix, round count and payload.
const FIELD_DELIMITER: char = ':';

/// Single-line transferable form of a finished battle report.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ReportTransfer {
    /// Report carried by the transfer string.
    pub report: BattleReport,
}

impl ReportTransfer {
    /// Encodes the report into a single-line string suitable for sharing.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let json =
            serde_json::to_vec(&self.report).expect("battle report serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!(
            "{TRANSFER_HEADER}:{}:{encoded}",
            self.report.rounds.len()
        )
    }

    /// Decodes a transfer string back into the report it carries.
    pub(crate) fn decode(value: &str) -> Result<Self, ReportTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ReportTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ReportTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(ReportTransferError::MissingVersion)?;
        let round_count = parts.next().ok_or(ReportTransferError::MissingRoundCount)?;
        let payload = parts.next().ok_or(ReportTransferError::MissingPayload)?;

        if domain != TRANSFER_DOMAIN {
            return Err(ReportTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != TRANSFER_VERSION {
            return Err(ReportTransferError::UnsupportedVersion(version.to_owned()));
        }

        let declared = round_count
            .trim()
            .parse::<usize>()
            .map_err(|_| ReportTransferError::InvalidRoundCount(round_count.to_owned()))?;

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ReportTransferError::InvalidEncoding)?;
        let report: BattleReport =
            serde_json::from_slice(&bytes).map_err(ReportTransferError::InvalidPayload)?;

        if report.rounds.len() != declared {
            return Err(ReportTransferError::RoundCountMismatch {
                declared,
                actual: report.rounds.len(),
            });
        }

        Ok(Self { report })
    }
}

/// Errors that can occur while decoding report transfer strings.
#[derive(Debug)]
pub(crate) enum ReportTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded report.
    MissingPrefix,
    /// The encoded report did not contain a version segment.
    MissingVersion,
    /// The encoded report did not include the round count.
    MissingRoundCount,
    /// The encoded report did not include the payload segment.
    MissingPayload,
    /// The encoded report used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded report used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The round count could not be parsed from the encoded report.
    InvalidRoundCount(String),
    /// The declared round count did not match the decoded round log.
    RoundCountMismatch {
        /// Round count declared by the transfer string.
        declared: usize,
        /// Number of rounds actually present in the payload.
        actual: usize,
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for ReportTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "transfer payload was empty"),
            Self::MissingPrefix => write!(f, "transfer string is missing the prefix"),
            Self::MissingVersion => write!(f, "transfer string is missing the version"),
            Self::MissingRoundCount => write!(f, "transfer string is missing the round count"),
            Self::MissingPayload => write!(f, "transfer string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "transfer prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "transfer version '{version}' is not supported")
            }
            Self::InvalidRoundCount(count) => {
                write!(f, "could not parse round count '{count}'")
            }
            Self::RoundCountMismatch { declared, actual } => {
                write!(
                    f,
                    "transfer declares {declared} rounds but the payload holds {actual}"
                )
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode report payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse report payload: {error}")
            }
        }
    }
}

impl Error for ReportTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
