//! Shared helpers for unit tests

use bytes::Bytes;
use ember_primitives::{Address, H256};
use ember_types::{DynamicFeeTx, LegacyTx, SignedTransaction, TxSignature};

/// One gwei in wei
pub const GWEI: u128 = 1_000_000_000;

pub fn sender_a() -> Address {
    Address::from_bytes([0x11; 20])
}

pub fn sender_b() -> Address {
    Address::from_bytes([0x22; 20])
}

fn sig() -> TxSignature {
    TxSignature::new(27, H256::from_bytes([1u8; 32]), H256::from_bytes([2u8; 32]))
}

/// Legacy transfer to a fixed destination
pub fn legacy_tx(nonce: u64, gas_price: u128) -> SignedTransaction {
    legacy_tx_to(nonce, gas_price, 0x42)
}

/// Legacy transfer with a chosen destination byte, to vary content at a
/// fixed fee
pub fn legacy_tx_to(nonce: u64, gas_price: u128, to_byte: u8) -> SignedTransaction {
    SignedTransaction::new_legacy(
        LegacyTx {
            nonce,
            gas_price,
            gas_limit: 21000,
            to: Some(Address::from_bytes([to_byte; 20])),
            value: 1,
            data: Bytes::new(),
        },
        sig(),
    )
}

/// Dynamic-fee transfer
pub fn dynamic_tx(nonce: u64, tip_cap: u128, fee_cap: u128) -> SignedTransaction {
    SignedTransaction::new_dynamic_fee(
        DynamicFeeTx {
            chain_id: 1,
            nonce,
            max_priority_fee_per_gas: tip_cap,
            max_fee_per_gas: fee_cap,
            gas_limit: 21000,
            to: Some(Address::from_bytes([0x42; 20])),
            value: 1,
            data: Bytes::new(),
            access_list: vec![],
        },
        sig(),
    )
}
