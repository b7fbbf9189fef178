//! Forward-only cursor over an [`Ops`] list.

use super::{OpType, Ops, Ref};
use crate::error::OpsError;

/// One record: its kind, its bytes (tag included) and the refs it owns.
#[derive(Debug, Clone, Copy)]
pub struct EncodedOp<'a> {
    pub kind: OpType,
    /// Byte offset of the record in the stream.
    pub offset: usize,
    pub data: &'a [u8],
    pub refs: &'a [Ref],
}

/// Restartable cursor. Decoding is lazy; [`Reader::reset`] rewinds.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    ops: &'a Ops,
    pc: usize,
    ref_pc: usize,
}

impl<'a> Reader<'a> {
    pub fn new(ops: &'a Ops) -> Self {
        Self { ops, pc: 0, ref_pc: 0 }
    }

    /// Rewind to the start of `ops`.
    pub fn reset(&mut self, ops: &'a Ops) {
        self.ops = ops;
        self.pc = 0;
        self.ref_pc = 0;
    }

    /// Decode the next record, or `None` at the end of the stream.
    ///
    /// After an error the cursor is parked at the end, so a broken stream is
    /// never half-read twice.
    pub fn decode(&mut self) -> Result<Option<EncodedOp<'a>>, OpsError> {
        let ops: &'a Ops = self.ops;
        let data = ops.data();
        let refs = ops.refs();
        if self.pc >= data.len() {
            return Ok(None);
        }

        let offset = self.pc;
        let result = Self::frame_record(data, refs, offset, self.ref_pc);
        match result {
            Ok(op) => {
                self.pc += op.data.len();
                self.ref_pc += op.refs.len();
                Ok(Some(op))
            }
            Err(err) => {
                self.pc = data.len();
                self.ref_pc = refs.len();
                Err(err)
            }
        }
    }

    fn frame_record(
        data: &'a [u8],
        refs: &'a [Ref],
        offset: usize,
        ref_pc: usize,
    ) -> Result<EncodedOp<'a>, OpsError> {
        let tag = data[offset];
        let kind = OpType::from_byte(tag).ok_or(OpsError::UnknownTag { tag, offset })?;

        let need = kind.size();
        let have = data.len() - offset;
        if have < need {
            return Err(OpsError::Truncated {
                op: kind,
                offset,
                need,
                have,
            });
        }

        let need_refs = kind.num_refs();
        let have_refs = refs.len() - ref_pc;
        if have_refs < need_refs {
            return Err(OpsError::MissingRef {
                op: kind,
                offset,
                need: need_refs,
                have: have_refs,
            });
        }

        Ok(EncodedOp {
            kind,
            offset,
            data: &data[offset..offset + need],
            refs: &refs[ref_pc..ref_pc + need_refs],
        })
    }
}

impl<'a> Iterator for Reader<'a> {
    type Item = Result<EncodedOp<'a>, OpsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode().transpose()
    }
}
