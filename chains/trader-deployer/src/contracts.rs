//! Trader contract artifact and constructor arguments.

use core_logic::DeployError;
use ethers::abi::{Abi, Token};
use ethers::types::{Address, Bytes, U256};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Constructor arguments, in constructor order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraderArgs {
    pub compass: Address,
    pub refund_wallet: Address,
    pub gas_fee: U256,
    pub fee_collector: Address,
    pub service_fee: U256,
}

impl TraderArgs {
    pub fn tokens(&self) -> Vec<Token> {
        vec![
            Token::Address(self.compass),
            Token::Address(self.refund_wallet),
            Token::Uint(self.gas_fee),
            Token::Address(self.fee_collector),
            Token::Uint(self.service_fee),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// `"bytecode": "0x.."`
    Hex(String),
    /// `"bytecode": { "object": "0x.." }`
    Object { object: String },
    /// `"deploymentBytecode": { "bytecode": "0x.." }`
    Nested { bytecode: String },
}

impl RawBytecode {
    fn as_hex(&self) -> &str {
        match self {
            RawBytecode::Hex(s) => s,
            RawBytecode::Object { object } => object,
            RawBytecode::Nested { bytecode } => bytecode,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    abi: Option<Abi>,
    #[serde(default)]
    bytecode: Option<RawBytecode>,
    #[serde(default)]
    deployment_bytecode: Option<RawBytecode>,
}

/// Compiled contract: ABI (optional) and creation bytecode.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub abi: Option<Abi>,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeployError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DeployError::ArtifactRead {
            path: path.display().to_string(),
            msg: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// `origin` only labels errors.
    pub fn parse(content: &str, origin: &str) -> Result<Self, DeployError> {
        let parse_error = |reason: String| DeployError::ArtifactParse {
            path: origin.to_string(),
            reason,
        };

        let raw: RawArtifact =
            serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;

        let hex_code = raw
            .deployment_bytecode
            .as_ref()
            .or(raw.bytecode.as_ref())
            .map(RawBytecode::as_hex)
            .unwrap_or("")
            .trim();
        let hex_code = hex_code.strip_prefix("0x").unwrap_or(hex_code);

        if hex_code.is_empty() {
            return Err(DeployError::EmptyBytecode {
                path: origin.to_string(),
            });
        }

        let bytecode = hex::decode(hex_code)
            .map_err(|e| parse_error(format!("invalid bytecode hex: {}", e)))?;

        Ok(Self {
            abi: raw.abi,
            bytecode: bytecode.into(),
        })
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    ///
    /// When the ABI declares a constructor the arguments are type-checked
    /// against it.
    pub fn init_code(&self, args: &TraderArgs) -> Result<Bytes, DeployError> {
        let tokens = args.tokens();

        match self.abi.as_ref().and_then(|abi| abi.constructor()) {
            Some(constructor) => constructor
                .encode_input(self.bytecode.to_vec(), &tokens)
                .map(Bytes::from)
                .map_err(|e| DeployError::ConstructorEncoding {
                    reason: e.to_string(),
                }),
            None => {
                let mut code = self.bytecode.to_vec();
                code.extend(ethers::abi::encode(&tokens));
                Ok(code.into())
            }
        }
    }
}
