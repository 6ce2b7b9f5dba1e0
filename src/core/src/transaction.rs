//! Legacy-format transactions carrying a single system-program transfer.
//!
//! Wire layout of a message:
//!
//! ```text
//! header:           [num_required_signatures, num_readonly_signed, num_readonly_unsigned]
//! account_keys:     compact-u16 length, then 32 bytes per key
//! recent_blockhash: 32 bytes
//! instructions:     compact-u16 length, then per instruction:
//!                   program_id_index, compact accounts, compact data
//! ```
//!
//! A transaction is a compact-u16 array of 64-byte signatures followed by the
//! message bytes the signatures cover.

use crate::types::{Hash, Pubkey, Signature, TransferRequest};
use byteorder::{ByteOrder, LittleEndian};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// The system program, which owns native transfers.
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new([0u8; 32]);

/// Index of the `Transfer` variant in the system program's instruction enum.
const SYSTEM_TRANSFER_INSTRUCTION: u32 = 2;

/// Signature and read-only counts for the message's account list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    /// Accounts that must sign, listed first
    pub num_required_signatures: u8,
    /// Trailing signers that are read-only
    pub num_readonly_signed_accounts: u8,
    /// Trailing non-signers that are read-only
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction whose accounts are indices into the message's account list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledInstruction {
    /// Index of the program account
    pub program_id_index: u8,
    /// Indices of the accounts passed to the program
    pub accounts: Vec<u8>,
    /// Program input
    pub data: Vec<u8>,
}

/// The signed portion of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Account signature requirements
    pub header: MessageHeader,
    /// All accounts the transaction references, signers first
    pub account_keys: Vec<Pubkey>,
    /// Blockhash the transaction is valid against
    pub recent_blockhash: Hash,
    /// Instructions to execute in order
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Builds a message with one system transfer from `from` to `to`.
    pub fn transfer(from: &Pubkey, to: &Pubkey, lamports: u64, recent_blockhash: Hash) -> Self {
        let mut data = vec![0u8; 12];
        LittleEndian::write_u32(&mut data[..4], SYSTEM_TRANSFER_INSTRUCTION);
        LittleEndian::write_u64(&mut data[4..], lamports);

        // Account keys are deduplicated, so a transfer to self references one writable signer
        let (account_keys, accounts) = if from == to {
            (vec![*from, SYSTEM_PROGRAM_ID], vec![0, 0])
        } else {
            (vec![*from, *to, SYSTEM_PROGRAM_ID], vec![0, 1])
        };
        let program_id_index = (account_keys.len() - 1) as u8;

        Self {
            header: MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            },
            account_keys,
            recent_blockhash,
            instructions: vec![CompiledInstruction {
                program_id_index,
                accounts,
                data,
            }],
        }
    }

    /// Serializes the message into the bytes that get signed.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(160);
        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        write_compact_u16(&mut buf, self.account_keys.len());
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(&self.recent_blockhash.0);

        write_compact_u16(&mut buf, self.instructions.len());
        for instruction in &self.instructions {
            buf.push(instruction.program_id_index);
            write_compact_u16(&mut buf, instruction.accounts.len());
            buf.extend_from_slice(&instruction.accounts);
            write_compact_u16(&mut buf, instruction.data.len());
            buf.extend_from_slice(&instruction.data);
        }

        buf
    }
}

/// A message together with its signatures, ready to submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    signatures: Vec<Signature>,
    message: Message,
}

impl SignedTransaction {
    /// Builds and signs a transfer from `from` as described by `request`.
    pub fn transfer(from: &SigningKey, request: &TransferRequest, recent_blockhash: Hash) -> Self {
        let message = Message::transfer(
            &Pubkey::from(&from.verifying_key()),
            &request.to,
            request.lamports,
            recent_blockhash,
        );
        let signature = from.sign(&message.serialize());

        Self {
            signatures: vec![Signature::from(signature)],
            message,
        }
    }

    /// The fee payer's signature, which is also the transaction id.
    pub fn signature(&self) -> &Signature {
        &self.signatures[0]
    }

    /// Gets the signed message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Checks every signature against its signer's key.
    pub fn verify(&self) -> bool {
        let signed = self.message.serialize();
        let signers = self.message.header.num_required_signatures as usize;
        if self.signatures.len() != signers || self.message.account_keys.len() < signers {
            return false;
        }

        self.signatures
            .iter()
            .zip(&self.message.account_keys)
            .all(|(signature, key)| {
                let public = match VerifyingKey::from_bytes(key.as_bytes()) {
                    Ok(public) => public,
                    Err(_) => return false,
                };
                let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
                public.verify(&signed, &signature).is_ok()
            })
    }

    /// Serializes the transaction into its wire form.
    pub fn serialize(&self) -> Vec<u8> {
        let message = self.message.serialize();
        let mut buf = Vec::with_capacity(1 + 64 * self.signatures.len() + message.len());
        write_compact_u16(&mut buf, self.signatures.len());
        for signature in &self.signatures {
            buf.extend_from_slice(signature.as_bytes());
        }
        buf.extend_from_slice(&message);
        buf
    }
}

/// Writes a length as a compact-u16: 7 bits per byte, high bit set on all but the last.
fn write_compact_u16(buf: &mut Vec<u8>, len: usize) {
    let mut value = len as u16;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}
