// Batch assembly
//
// Streaming grouping of output items into fixed-capacity batches. The
// assembler never buffers more than one batch; a sealed batch is handed to
// the caller immediately so it can be uploaded before extraction resumes.
// Each batch gets a fresh UUID-suffixed destination prefix at seal time,
// unique for the process lifetime by construction.

use uuid::Uuid;

/// A classified, deduplicated item ready for upload.
#[derive(Debug, Clone)]
pub struct OutputItem {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// An ordered group of output items sharing one destination prefix.
#[derive(Debug)]
pub struct Batch {
    pub prefix: String,
    pub items: Vec<OutputItem>,
}

impl Batch {
    /// Destination key for one item of this batch.
    pub fn key_for(&self, name: &str) -> String {
        format!("{}/{}", self.prefix, name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Groups items into batches of at most `capacity` under a shared prefix
/// base. `push` returns a sealed batch whenever the pending group fills;
/// `finish` seals any remainder.
pub struct BatchAssembler {
    capacity: usize,
    prefix_base: String,
    pending: Vec<OutputItem>,
}

impl BatchAssembler {
    /// `capacity` must be non-zero; configuration validation enforces it.
    pub fn new(capacity: usize, prefix_base: impl Into<String>) -> Self {
        let prefix_base = prefix_base.into().trim_end_matches('/').to_string();
        Self {
            capacity: capacity.max(1),
            prefix_base,
            pending: Vec::new(),
        }
    }

    /// Append one item; returns the sealed batch if it reached capacity.
    pub fn push(&mut self, item: OutputItem) -> Option<Batch> {
        self.pending.push(item);
        if self.pending.len() >= self.capacity {
            Some(self.seal())
        } else {
            None
        }
    }

    /// Seal whatever is pending as a final, possibly short, batch.
    pub fn finish(mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.seal())
        }
    }

    fn seal(&mut self) -> Batch {
        let batch_id = Uuid::new_v4();
        let prefix = if self.prefix_base.is_empty() {
            batch_id.to_string()
        } else {
            format!("{}/{}", self.prefix_base, batch_id)
        };
        Batch {
            prefix,
            items: std::mem::take(&mut self.pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: usize) -> OutputItem {
        OutputItem {
            name: format!("item-{n}.xml"),
            bytes: vec![0u8; 4],
        }
    }

    fn drain(count: usize, capacity: usize) -> Vec<Batch> {
        let mut assembler = BatchAssembler::new(capacity, "uploads");
        let mut batches = Vec::new();
        for n in 0..count {
            if let Some(batch) = assembler.push(item(n)) {
                batches.push(batch);
            }
        }
        if let Some(batch) = assembler.finish() {
            batches.push(batch);
        }
        batches
    }

    #[test]
    fn batch_count_is_ceiling_of_items_over_capacity() {
        for (count, capacity, expected) in [(0, 3, 0), (1, 3, 1), (3, 3, 1), (7, 3, 3), (9, 3, 3)] {
            let batches = drain(count, capacity);
            assert_eq!(batches.len(), expected, "count={count} capacity={capacity}");
        }
    }

    #[test]
    fn all_batches_but_the_last_are_full() {
        let batches = drain(7, 3);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[1].len(), 3);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn evenly_divisible_input_produces_only_full_batches() {
        let batches = drain(6, 3);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 3));
    }

    #[test]
    fn item_order_is_preserved_across_batches() {
        let batches = drain(5, 2);
        let names: Vec<_> = batches
            .iter()
            .flat_map(|b| b.items.iter().map(|i| i.name.clone()))
            .collect();
        let expected: Vec<_> = (0..5).map(|n| format!("item-{n}.xml")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn every_batch_gets_a_distinct_prefix_under_the_base() {
        let batches = drain(9, 2);
        let mut prefixes = std::collections::HashSet::new();
        for batch in &batches {
            assert!(batch.prefix.starts_with("uploads/"));
            assert!(prefixes.insert(batch.prefix.clone()));
        }
    }

    #[test]
    fn key_joins_prefix_and_name() {
        let batches = drain(1, 2);
        let key = batches[0].key_for("a.xml");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with("/a.xml"));
    }

    #[test]
    fn empty_prefix_base_yields_bare_uuid_prefix() {
        let mut assembler = BatchAssembler::new(1, "");
        let batch = assembler.push(item(0)).unwrap();
        assert!(!batch.prefix.starts_with('/'));
        assert!(!batch.prefix.contains("//"));
    }
}
