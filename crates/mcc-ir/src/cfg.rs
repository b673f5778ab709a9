//! Basic-block partitioning and reachability.
//!
//! Blocks are a derived view over the linear stream: each holds an
//! inclusive `start..=end` index range, and together they partition the
//! program. The block graph is rebuilt from scratch whenever it is needed;
//! instruction indices go stale the moment the stream is edited, so no
//! block data survives a rewrite pass.

use mcc_util::{Idx, IndexVec, Symbol};
use rustc_hash::FxHashMap;

use crate::ir::{Instr, IrProgram};

/// Identifies a block within one [`build_blocks`] result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

impl Idx for BlockId {
    fn from_usize(idx: usize) -> Self {
        BlockId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A maximal straight-line run of instructions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicBlock {
    /// Index of the first instruction in the block.
    pub start: usize,
    /// Index of the last instruction in the block (inclusive).
    pub end: usize,
    pub successors: Vec<BlockId>,
    pub reachable: bool,
}

/// Partition `program` into basic blocks and wire up the successor edges.
///
/// A block begins at index 0 and at every `LABEL`; it ends immediately
/// before the next block's start, the last block extending to the final
/// instruction. Successors come from the block's terminating instruction:
/// a `JUMP` has its target, conditional jumps have the target plus the
/// fall-through block, `RETURN` has none, and anything else falls through.
pub fn build_blocks(program: &IrProgram) -> IndexVec<BlockId, BasicBlock> {
    let instrs = &program.instructions;
    let mut blocks: IndexVec<BlockId, BasicBlock> = IndexVec::new();
    if instrs.is_empty() {
        return blocks;
    }

    let mut starts = vec![0usize];
    for (i, instr) in instrs.iter().enumerate() {
        if i > 0 && matches!(instr, Instr::Label(_)) {
            starts.push(i);
        }
    }

    let mut label_blocks: FxHashMap<Symbol, BlockId> = FxHashMap::default();
    for (block_index, &start) in starts.iter().enumerate() {
        let end = starts
            .get(block_index + 1)
            .map_or(instrs.len() - 1, |&next| next - 1);
        let id = blocks.push(BasicBlock {
            start,
            end,
            successors: Vec::new(),
            reachable: false,
        });
        if let Instr::Label(label) = &instrs[start] {
            label_blocks.insert(label.name, id);
        }
    }

    for id in blocks.indices().collect::<Vec<_>>() {
        let end = blocks[id].end;
        let fall_through = BlockId(id.0 + 1);
        let has_fall_through = (fall_through.index()) < blocks.len();
        let mut successors = Vec::new();

        match &instrs[end] {
            Instr::Jump(label) => {
                if let Some(&target) = label_blocks.get(&label.name) {
                    successors.push(target);
                }
            }
            Instr::JumpZ { target, .. } | Instr::JumpNz { target, .. } => {
                if let Some(&target_block) = label_blocks.get(&target.name) {
                    successors.push(target_block);
                }
                if has_fall_through {
                    successors.push(fall_through);
                }
            }
            Instr::Return { .. } => {}
            _ => {
                if has_fall_through {
                    successors.push(fall_through);
                }
            }
        }
        blocks[id].successors = successors;
    }

    blocks
}

/// Mark every block reachable from the program roots, iterating to a
/// fixed point.
///
/// The roots are block 0 and every block that starts with a function-entry
/// label: entry labels are callable symbols, reachable through `CALL`
/// rather than through jump edges, so they seed the propagation.
///
/// Returns the number of full passes taken; convergence needs at most
/// `|blocks|` of them, since each productive pass marks at least one new
/// block.
pub fn mark_reachable(program: &IrProgram, blocks: &mut IndexVec<BlockId, BasicBlock>) -> usize {
    if blocks.is_empty() {
        return 0;
    }
    blocks[BlockId(0)].reachable = true;
    for id in blocks.indices().collect::<Vec<_>>() {
        if let Instr::Label(label) = &program.instructions[blocks[id].start] {
            if label.is_entry() {
                blocks[id].reachable = true;
            }
        }
    }

    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for id in blocks.indices().collect::<Vec<_>>() {
            if !blocks[id].reachable {
                continue;
            }
            for successor in blocks[id].successors.clone() {
                if !blocks[successor].reachable {
                    blocks[successor].reachable = true;
                    changed = true;
                }
            }
        }
        if !changed {
            return passes;
        }
    }
}
