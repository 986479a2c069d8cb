//! Structured logging helpers.
//!
//! Every bridge log line carries the same core fields so log queries can join
//! a deposit across the synchronizer, dispatcher and monitor:
//! - `network_id`: network the synchronizer watches
//! - `tx_hash`: transaction that emitted the bridge event
//! - `deposit_count`: per-network deposit sequence number

/// Log a deposit-related event with standard fields.
#[macro_export]
macro_rules! log_deposit_event {
    ($level:ident, $network_id:expr, $deposit:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            network_id = $network_id,
            tx_hash = %$deposit.tx_hash,
            deposit_count = $deposit.deposit_count,
            block_number = $deposit.block_number,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a claim-related event with standard fields.
#[macro_export]
macro_rules! log_claim_event {
    ($level:ident, $network_id:expr, $claim:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            network_id = $network_id,
            tx_hash = %$claim.tx_hash,
            claim_index = $claim.index,
            mainnet_flag = $claim.mainnet_flag,
            $($($field)*,)?
            $msg
        )
    };
}
