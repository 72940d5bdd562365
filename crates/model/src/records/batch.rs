use crate::records::row::TargetRecord;

/// A bounded slice of transformed records written in one round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Zero-based position of this chunk within the entity's record stream.
    pub index: usize,
    pub total: usize,
    pub rows: Vec<TargetRecord>,
}

impl Batch {
    /// Splits `rows` into consecutive chunks of at most `size` records,
    /// preserving order. A zero size is treated as one.
    pub fn split(rows: Vec<TargetRecord>, size: usize) -> Vec<Batch> {
        let size = size.max(1);
        let total = rows.len().div_ceil(size);
        let mut batches = Vec::with_capacity(total);
        let mut iter = rows.into_iter().peekable();
        let mut index = 0;
        while iter.peek().is_some() {
            let chunk: Vec<TargetRecord> = iter.by_ref().take(size).collect();
            batches.push(Batch {
                index,
                total,
                rows: chunk,
            });
            index += 1;
        }
        batches
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Human-readable position, e.g. `2/3`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.index + 1, self.total)
    }
}
