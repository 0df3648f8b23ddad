//! Oracle registration and index assignment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_types::{Address, ProtocolParams, Wei};
use surety_vrf::{draw_distinct_indexes, VrfProvider};
use tracing::info;

use crate::error::OracleError;

/// Number of indexes each oracle holds.
pub const INDEXES_PER_ORACLE: usize = 3;

/// A registered oracle. Immutable after registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    pub address: Address,
    /// Distinct indexes in draw order. Need not be unique across oracles.
    pub indexes: [u8; INDEXES_PER_ORACLE],
}

impl Oracle {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleRegistry {
    registration_fee: Wei,
    index_space: u8,
    oracles: BTreeMap<Address, Oracle>,
}

impl OracleRegistry {
    pub fn new(params: &ProtocolParams) -> Self {
        Self {
            registration_fee: params.oracle_registration_fee,
            index_space: params.oracle_index_space,
            oracles: BTreeMap::new(),
        }
    }

    /// Register an oracle against the fee and assign its indexes.
    pub fn register(
        &mut self,
        rng: &dyn VrfProvider,
        address: Address,
        fee: Wei,
    ) -> Result<[u8; INDEXES_PER_ORACLE], OracleError> {
        if fee < self.registration_fee {
            return Err(OracleError::InsufficientFee {
                provided: fee,
                required: self.registration_fee,
            });
        }
        if self.oracles.contains_key(&address) {
            return Err(OracleError::AlreadyRegistered(address));
        }

        let drawn = draw_distinct_indexes(
            rng,
            address.as_bytes(),
            self.index_space,
            INDEXES_PER_ORACLE as u8,
        )?;
        let mut indexes = [0u8; INDEXES_PER_ORACLE];
        indexes.copy_from_slice(&drawn);

        self.oracles.insert(address, Oracle { address, indexes });
        info!(oracle = %address, ?indexes, "oracle registered");
        Ok(indexes)
    }

    pub fn indexes_of(&self, address: &Address) -> Result<[u8; INDEXES_PER_ORACLE], OracleError> {
        self.oracles
            .get(address)
            .map(|o| o.indexes)
            .ok_or(OracleError::NotRegistered(*address))
    }

    pub fn get(&self, address: &Address) -> Option<&Oracle> {
        self.oracles.get(address)
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.oracles.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    pub fn index_space(&self) -> u8 {
        self.index_space
    }
}
