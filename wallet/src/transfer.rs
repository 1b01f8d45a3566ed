//! Transfer construction and signing.
//!
//! A [`TransferIntent`] is the ephemeral description of one outbound message:
//! destination, amount, bounce flag, optional body. [`sign_transfer`] binds
//! it to a sender, a sequence number, and an optional validity deadline, then
//! signs the Blake2b digest of a canonical byte encoding with the sender's
//! Ed25519 key. The node re-derives the digest and checks the signature
//! against the public key embedded in the sender address.

use serde::{Deserialize, Serialize};
use spinup_types::{Address, Amount, KeyPair};

/// One outbound message, before it is bound to a sender and sequence number.
#[derive(Clone, Debug)]
pub struct TransferIntent {
    pub to: Address,
    pub amount: Amount,
    /// Whether unprocessable value is returned to the sender by the network.
    /// Disabled for account initialization: the destination does not exist
    /// yet, and a bounced deposit would defeat the point.
    pub bounce: bool,
    /// Opaque message body attached to the transfer.
    pub body: Option<String>,
}

/// A fully signed transfer, ready for submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedTransfer {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    /// Sender sequence number this transfer is valid against.
    pub sequence: u64,
    pub bounce: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Unix timestamp (seconds) after which the node discards the transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<u64>,
    /// Hex-encoded sender public key.
    pub public_key: String,
    /// Hex-encoded Ed25519 signature over the canonical digest.
    pub signature: String,
}

/// Canonical signing bytes: every field length-prefixed or fixed-width, so
/// no two distinct transfers share an encoding.
fn signing_bytes(
    from: &Address,
    intent: &TransferIntent,
    sequence: u64,
    valid_until: Option<u64>,
) -> Vec<u8> {
    let body = intent.body.as_deref().unwrap_or("");
    let mut bytes = Vec::with_capacity(64 + 8 + 16 + 1 + 8 + 8 + body.len());
    bytes.extend_from_slice(&from.public_key_bytes());
    bytes.extend_from_slice(&intent.to.public_key_bytes());
    bytes.extend_from_slice(&intent.amount.raw().to_be_bytes());
    bytes.extend_from_slice(&sequence.to_be_bytes());
    bytes.push(intent.bounce as u8);
    bytes.extend_from_slice(&valid_until.unwrap_or(0).to_be_bytes());
    bytes.extend_from_slice(&(body.len() as u64).to_be_bytes());
    bytes.extend_from_slice(body.as_bytes());
    bytes
}

/// Sign a transfer intent with the sender's keys.
pub fn sign_transfer(
    intent: &TransferIntent,
    from: &Address,
    sequence: u64,
    valid_until: Option<u64>,
    keys: &KeyPair,
) -> SignedTransfer {
    let digest = spinup_crypto::blake2b_256(&signing_bytes(from, intent, sequence, valid_until));
    let signature = spinup_crypto::sign_message(&digest, &keys.private);

    SignedTransfer {
        from: from.clone(),
        to: intent.to.clone(),
        amount: intent.amount,
        sequence,
        bounce: intent.bounce,
        body: intent.body.clone(),
        valid_until,
        public_key: keys.public.to_hex(),
        signature: signature.to_hex(),
    }
}

/// Verify a signed transfer's signature against its own fields.
pub fn verify_transfer(transfer: &SignedTransfer) -> bool {
    let intent = TransferIntent {
        to: transfer.to.clone(),
        amount: transfer.amount,
        bounce: transfer.bounce,
        body: transfer.body.clone(),
    };
    let digest = spinup_crypto::blake2b_256(&signing_bytes(
        &transfer.from,
        &intent,
        transfer.sequence,
        transfer.valid_until,
    ));

    let Ok(key_bytes) = hex::decode(&transfer.public_key) else {
        return false;
    };
    let Ok(key_bytes): Result<[u8; 32], _> = key_bytes.try_into() else {
        return false;
    };
    let Ok(sig_bytes) = hex::decode(&transfer.signature) else {
        return false;
    };
    let Ok(sig_bytes): Result<[u8; 64], _> = sig_bytes.try_into() else {
        return false;
    };

    spinup_crypto::verify_signature(
        &digest,
        &spinup_types::Signature(sig_bytes),
        &spinup_types::PublicKey(key_bytes),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinup_crypto::{derive_address, generate_keypair};

    fn intent(to: &Address) -> TransferIntent {
        TransferIntent {
            to: to.clone(),
            amount: Amount::from_raw(20_000_000),
            bounce: false,
            body: None,
        }
    }

    #[test]
    fn signed_transfer_verifies() {
        let sender = generate_keypair();
        let from = derive_address(&sender.public);
        let to = derive_address(&generate_keypair().public);

        let signed = sign_transfer(&intent(&to), &from, 5, None, &sender);
        assert!(verify_transfer(&signed));
        assert_eq!(signed.sequence, 5);
        assert!(!signed.bounce);
    }

    #[test]
    fn tampered_amount_fails_verification() {
        let sender = generate_keypair();
        let from = derive_address(&sender.public);
        let to = derive_address(&generate_keypair().public);

        let mut signed = sign_transfer(&intent(&to), &from, 5, None, &sender);
        signed.amount = Amount::from_raw(999);
        assert!(!verify_transfer(&signed));
    }

    #[test]
    fn tampered_body_fails_verification() {
        let sender = generate_keypair();
        let from = derive_address(&sender.public);
        let to = derive_address(&generate_keypair().public);

        let mut base = intent(&to);
        base.body = Some("init".into());
        let mut signed = sign_transfer(&base, &from, 1, Some(1_700_000_300), &sender);
        signed.body = Some("drain".into());
        assert!(!verify_transfer(&signed));
    }

    #[test]
    fn validity_window_is_covered_by_signature() {
        let sender = generate_keypair();
        let from = derive_address(&sender.public);
        let to = derive_address(&generate_keypair().public);

        let mut signed = sign_transfer(&intent(&to), &from, 1, Some(1_700_000_300), &sender);
        signed.valid_until = Some(2_000_000_000);
        assert!(!verify_transfer(&signed));
    }

    #[test]
    fn wire_json_omits_absent_options() {
        let sender = generate_keypair();
        let from = derive_address(&sender.public);
        let to = derive_address(&generate_keypair().public);

        let signed = sign_transfer(&intent(&to), &from, 5, None, &sender);
        let json = serde_json::to_value(&signed).unwrap();
        assert!(json.get("body").is_none());
        assert!(json.get("valid_until").is_none());
        assert_eq!(json["sequence"], 5);
    }
}
