use std::sync::Arc;

use alloy::{
    dyn_abi::{DynSolValue, EventExt, FunctionExt, JsonAbiExt},
    json_abi::{Event, Function, JsonAbi},
    primitives::{Address, LogData},
};

use super::InterfaceDescription;
use crate::{chain::Chain, error::InterfaceError};

/// A deployed contract paired with the ABI used to talk to it.
#[derive(Clone, Debug)]
pub struct ContractHandle {
    address: Address,
    abi: Arc<JsonAbi>,
}

impl ContractHandle {
    pub fn new(address: Address, abi: JsonAbi) -> Self {
        Self {
            address,
            abi: Arc::new(abi),
        }
    }

    pub fn from_description(
        address: Address,
        description: &InterfaceDescription,
    ) -> Result<Self, InterfaceError> {
        Ok(Self::new(address, description.parse()?))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn function(&self, name: &str) -> Result<&Function, InterfaceError> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| InterfaceError::UnknownFunction {
                address: self.address,
                name: name.to_string(),
            })
    }

    pub fn event(&self, name: &str) -> Result<&Event, InterfaceError> {
        self.abi
            .event(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| InterfaceError::UnknownEvent {
                address: self.address,
                name: name.to_string(),
            })
    }

    pub async fn call(
        &self,
        chain: &dyn Chain,
        name: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, InterfaceError> {
        let function = self.function(name)?;
        let input = function.abi_encode_input(args)?;
        let output = chain.call(self.address, input.into()).await?;
        Ok(function.abi_decode_output(&output)?)
    }

    pub fn decode_log(&self, event: &Event, log: &LogData) -> Result<DecodedFields, InterfaceError> {
        let decoded = event.decode_log(log)?;
        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();

        let fields = event
            .inputs
            .iter()
            .filter_map(|param| {
                let value = if param.indexed {
                    indexed.next()
                } else {
                    body.next()
                };
                value.map(|value| (param.name.clone(), value))
            })
            .collect();

        Ok(DecodedFields(fields))
    }
}

/// Event parameters by name, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFields(Vec<(String, DynSolValue)>);

impl DecodedFields {
    pub fn get(&self, name: &str) -> Option<&DynSolValue> {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
