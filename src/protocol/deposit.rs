use std::collections::HashMap;

use tracing::{info, warn};

use super::coin::{verify_coin, CoinBody};
use super::forensics::{determine_cheater, Cheater};
use super::{CoinId, ProtocolParams, Transcript};
use crate::primitives::{BankPublicKey, Signature};
use crate::{Error, Result};

/// Result of depositing one acceptance transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DepositOutcome {
    /// First deposit of this coin; the merchant is credited.
    Credited {
        /// Face value credited.
        amount: u64,
    },
    /// The coin was deposited before. Nothing is credited.
    Rejected(Cheater),
}

/// In-memory record of deposited coins for one bank key.
///
/// Owned by the caller; nothing is persisted.
#[derive(Debug)]
pub struct DepositLedger {
    bank_key: BankPublicKey,
    params: ProtocolParams,
    deposits: HashMap<CoinId, Transcript>,
}

impl DepositLedger {
    /// Creates an empty ledger.
    pub fn new(bank_key: BankPublicKey, params: ProtocolParams) -> Self {
        Self {
            bank_key,
            params,
            deposits: HashMap::new(),
        }
    }

    /// Deposits a spent coin together with the merchant's transcript.
    ///
    /// The signature and every disclosed share are checked again so that a
    /// merchant cannot deposit forged transcripts or frame a purchaser.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSignature`] if the coin does not verify
    /// - [`Error::MalformedTranscript`] if the transcript is for another coin or
    ///   has the wrong length
    /// - [`Error::RisTamperDetected`] if a disclosed share does not match the
    ///   coin's commitments
    pub fn deposit(
        &mut self,
        body: &CoinBody,
        signature: &Signature,
        transcript: Transcript,
    ) -> Result<DepositOutcome> {
        let id = body.id();
        if !verify_coin(body, signature, &self.bank_key) {
            warn!(coin = %id, "deposit of coin with invalid signature");
            return Err(Error::InvalidSignature(format!(
                "deposited coin {id} is not signed by this bank"
            )));
        }
        transcript.ensure_shape(id, self.params.ris_length())?;
        if let Some(element) = transcript
            .elements()
            .iter()
            .find(|e| !e.matches(body.commitments()))
        {
            warn!(coin = %id, position = element.position(), "deposited transcript does not match commitments");
            return Err(Error::RisTamperDetected {
                position: element.position(),
            });
        }

        match self.deposits.get(&id) {
            Some(previous) => {
                let cheater = determine_cheater(id, previous, &transcript, &self.params)?;
                warn!(coin = %id, %cheater, "repeated deposit rejected");
                Ok(DepositOutcome::Rejected(cheater))
            }
            None => {
                self.deposits.insert(id, transcript);
                info!(coin = %id, amount = body.amount(), "deposit credited");
                Ok(DepositOutcome::Credited {
                    amount: body.amount(),
                })
            }
        }
    }

    /// Returns `true` if the coin has been deposited.
    pub fn contains(&self, id: CoinId) -> bool {
        self.deposits.contains_key(&id)
    }

    /// Number of distinct coins deposited.
    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    /// Returns `true` if nothing has been deposited.
    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }
}
