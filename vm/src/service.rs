//! Request/reply adapter over the controller.
//!
//! Outer surfaces (an RPC handler, a CLI) speak hex strings. This adapter
//! decodes them, calls into [`TimestampVm`], and shapes the replies.

use serde::Serialize;
use tsvm_primitives::{id_to_hex, Block, BlockId};
use tsvm_store::Database;

use crate::engine::ChainVm;
use crate::error::{VmError, VmResult};
use crate::vm::TimestampVm;

/// A block as reported to clients. Byte fields are lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetBlockReply {
    pub id: String,
    pub parent_id: String,
    pub height: u64,
    pub timestamp: u64,
    pub data: String,
    pub status: String,
}

impl From<&Block> for GetBlockReply {
    fn from(block: &Block) -> Self {
        Self {
            id: id_to_hex(&block.id()),
            parent_id: id_to_hex(&block.parent_id()),
            height: block.height(),
            timestamp: block.timestamp(),
            data: hex::encode(block.payload()),
            status: block.status().as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProposeBlockReply {
    pub success: bool,
}

/// Hex-encode a payload the way [`Service::propose_block`] expects it.
pub fn encode_payload(data: &[u8]) -> String {
    hex::encode(data)
}

pub struct Service<'a, D: Database> {
    vm: &'a mut TimestampVm<D>,
}

impl<'a, D: Database> Service<'a, D> {
    pub fn new(vm: &'a mut TimestampVm<D>) -> Self {
        Self { vm }
    }

    /// Fetch a block by hex id, or the last accepted block when `id` is `None`.
    pub fn get_block(&self, id: Option<&str>) -> VmResult<GetBlockReply> {
        let id = match id {
            Some(id) => parse_id(id)?,
            None => self.vm.last_accepted()?,
        };
        let block = self.vm.get_block(&id)?;
        Ok(GetBlockReply::from(&block))
    }

    /// Queue a hex-encoded payload for a future block.
    pub fn propose_block(&mut self, data: &str) -> VmResult<ProposeBlockReply> {
        let bytes = hex::decode(strip_prefix(data))
            .map_err(|err| VmError::BadRequest(format!("couldn't decode data: {err}")))?;
        self.vm.propose_payload(&bytes)?;
        Ok(ProposeBlockReply { success: true })
    }
}

fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

fn parse_id(s: &str) -> VmResult<BlockId> {
    let bytes = hex::decode(strip_prefix(s))
        .map_err(|err| VmError::BadRequest(format!("couldn't parse block id: {err}")))?;
    bytes.as_slice().try_into().map_err(|_| {
        VmError::BadRequest(format!("block id must be 32 bytes, got {}", bytes.len()))
    })
}
