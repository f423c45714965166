//! Cheater determination from two acceptance transcripts of one coin.
//!
//! Two honest merchants choose their challenge sides independently, so two
//! spends of the same coin disclose opposite sides at some position with
//! probability `1 - 2^-ris_length`. Combining those two shares reveals the
//! purchaser identity. A transcript deposited twice never differs at any
//! position, which is how merchant fraud shows up.

use core::fmt;

use tracing::{info, warn};

use super::commitment::{reveal_identity, DecodeFailure};
use super::{CoinId, ProtocolParams, RisElement, Transcript};
use crate::Result;

/// Who is responsible for a repeated coin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cheater {
    /// The purchaser spent the coin twice; their identity was recovered.
    Purchaser(String),
    /// No identity could be recovered: the same transcript was deposited twice.
    Merchant,
}

impl fmt::Display for Cheater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cheater::Purchaser(identity) => f.write_str(identity),
            Cheater::Merchant => f.write_str("merchant"),
        }
    }
}

/// What one position of two transcripts says.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PositionOutcome {
    /// Both merchants asked for the same side.
    SameSide,
    /// Opposite sides were disclosed and they decode to this identity.
    Identified(String),
    /// Opposite sides were disclosed but they do not decode.
    Undecodable(DecodeFailure),
}

/// Full per-position report plus the resulting verdict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Investigation {
    /// Outcome at every position, in order.
    pub outcomes: Vec<PositionOutcome>,
    /// Verdict derived from the outcomes.
    pub verdict: Cheater,
}

/// Compares one position of two transcripts.
///
/// Sides are compared through the recorded flags, not by share equality.
pub fn inspect_position(a: &RisElement, b: &RisElement, params: &ProtocolParams) -> PositionOutcome {
    if a.side() == b.side() {
        return PositionOutcome::SameSide;
    }
    match reveal_identity(a.value(), b.value(), params) {
        Ok(identity) => PositionOutcome::Identified(identity),
        Err(failure) => PositionOutcome::Undecodable(failure),
    }
}

/// Decides who cheated with coin `coin_id`.
///
/// Returns at the first position that reveals an identity. Positions that do
/// not decode are logged and skipped.
///
/// # Errors
///
/// Returns [`Error::MalformedTranscript`](crate::Error::MalformedTranscript) if
/// either transcript is for another coin or does not have `ris_length`
/// elements.
pub fn determine_cheater(
    coin_id: CoinId,
    a: &Transcript,
    b: &Transcript,
    params: &ProtocolParams,
) -> Result<Cheater> {
    a.ensure_shape(coin_id, params.ris_length())?;
    b.ensure_shape(coin_id, params.ris_length())?;

    for (ea, eb) in a.elements().iter().zip(b.elements()) {
        match inspect_position(ea, eb, params) {
            PositionOutcome::SameSide => {}
            PositionOutcome::Identified(identity) => {
                info!(coin = %coin_id, position = ea.position(), "double spender identified");
                return Ok(Cheater::Purchaser(identity));
            }
            PositionOutcome::Undecodable(failure) => {
                warn!(coin = %coin_id, position = ea.position(), %failure, "opposite shares did not decode");
            }
        }
    }

    info!(coin = %coin_id, "no identity recovered, blaming merchant");
    Ok(Cheater::Merchant)
}

/// Like [`determine_cheater`] but inspects every position.
///
/// The verdict names the first identity found, as [`determine_cheater`] would.
///
/// # Errors
///
/// Same as [`determine_cheater`].
pub fn investigate(
    coin_id: CoinId,
    a: &Transcript,
    b: &Transcript,
    params: &ProtocolParams,
) -> Result<Investigation> {
    a.ensure_shape(coin_id, params.ris_length())?;
    b.ensure_shape(coin_id, params.ris_length())?;

    let outcomes: Vec<PositionOutcome> = a
        .elements()
        .iter()
        .zip(b.elements())
        .map(|(ea, eb)| inspect_position(ea, eb, params))
        .collect();

    let verdict = outcomes
        .iter()
        .find_map(|outcome| match outcome {
            PositionOutcome::Identified(identity) => Some(Cheater::Purchaser(identity.clone())),
            _ => None,
        })
        .unwrap_or(Cheater::Merchant);

    Ok(Investigation { outcomes, verdict })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::commitment::{encode_identity, split_identity};
    use crate::protocol::{Share, Side, COIN_ID_LEN};
    use crate::{Error, SecureRng};

    fn params() -> ProtocolParams {
        ProtocolParams::new(4, 32).unwrap()
    }

    fn coin_id() -> CoinId {
        CoinId::from([1u8; COIN_ID_LEN])
    }

    fn element(position: usize, side: Side, value: Share) -> RisElement {
        let hash = value.commitment();
        RisElement::new(position, side, value, hash)
    }

    fn transcript_with_sides(sides: [Side; 4], identity: &str) -> (Transcript, Transcript) {
        let mut rng = SecureRng::new();
        let shares = split_identity(identity, &params(), &mut rng).unwrap();
        let first = (0..4)
            .map(|i| element(i, sides[i], shares.get(sides[i], i).unwrap().clone()))
            .collect();
        let second = (0..4)
            .map(|i| element(i, Side::Left, shares.get(Side::Left, i).unwrap().clone()))
            .collect();
        (
            Transcript::new(coin_id(), first).unwrap(),
            Transcript::new(coin_id(), second).unwrap(),
        )
    }

    #[test]
    fn identical_transcripts_blame_merchant() {
        let (a, _) = transcript_with_sides([Side::Right; 4], "alice");
        assert_eq!(
            determine_cheater(coin_id(), &a, &a, &params()).unwrap(),
            Cheater::Merchant
        );
        assert_eq!(Cheater::Merchant.to_string(), "merchant");
    }

    #[test]
    fn opposite_side_reveals_identity() {
        let (a, b) = transcript_with_sides([Side::Left, Side::Left, Side::Right, Side::Left], "alice");
        let verdict = determine_cheater(coin_id(), &a, &b, &params()).unwrap();
        assert_eq!(verdict, Cheater::Purchaser("alice".to_string()));
        assert_eq!(verdict.to_string(), "alice");

        let report = investigate(coin_id(), &a, &b, &params()).unwrap();
        assert_eq!(report.outcomes[0], PositionOutcome::SameSide);
        assert_eq!(
            report.outcomes[2],
            PositionOutcome::Identified("alice".to_string())
        );
        assert_eq!(report.verdict, verdict);
    }

    #[test]
    fn undecodable_position_does_not_mask_later_identification() {
        let params = params();
        let plaintext = encode_identity("alice", &params).unwrap();
        let garbage = |b: u8| Share::new(vec![b; 32]);
        let pad = Share::new(vec![0x33; 32]);
        let other = Share::new(
            crate::primitives::pad::combine(pad.as_bytes(), &plaintext).unwrap(),
        );

        let a = Transcript::new(
            coin_id(),
            vec![
                element(0, Side::Left, garbage(1)),
                element(1, Side::Left, garbage(2)),
                element(2, Side::Left, pad),
                element(3, Side::Left, garbage(4)),
            ],
        )
        .unwrap();
        let b = Transcript::new(
            coin_id(),
            vec![
                element(0, Side::Right, garbage(5)),
                element(1, Side::Left, garbage(2)),
                element(2, Side::Right, other),
                element(3, Side::Left, garbage(4)),
            ],
        )
        .unwrap();

        let report = investigate(coin_id(), &a, &b, &params).unwrap();
        assert_eq!(
            report.outcomes[0],
            PositionOutcome::Undecodable(DecodeFailure::MissingSentinel)
        );
        assert_eq!(
            determine_cheater(coin_id(), &a, &b, &params).unwrap(),
            Cheater::Purchaser("alice".to_string())
        );
    }

    #[test]
    fn rejects_wrong_shape() {
        let (a, b) = transcript_with_sides([Side::Left; 4], "alice");
        let other_id = CoinId::from([2u8; COIN_ID_LEN]);
        assert!(matches!(
            determine_cheater(other_id, &a, &b, &params()),
            Err(Error::MalformedTranscript(_))
        ));

        let longer = ProtocolParams::new(5, 32).unwrap();
        assert!(matches!(
            determine_cheater(coin_id(), &a, &b, &longer),
            Err(Error::MalformedTranscript(_))
        ));
    }
}
