use crate::sm::Word;
use crate::types::Int;

/// Flat word-addressed memory. Code and the stack share one address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Int>,
}

impl Memory {
    pub fn with_capacity(size: usize) -> Self {
        Memory {
            cells: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn load(&self, address: usize) -> Option<Int> {
        self.cells.get(address).copied()
    }

    pub fn store(&mut self, address: usize, value: Int) -> Option<()> {
        let cell = self.cells.get_mut(address)?;
        *cell = value;
        Some(())
    }

    pub fn fetch(&self, address: usize) -> Option<Word> {
        match self.cells.get(address..address.checked_add(3)?)? {
            &[op, level, modifier] => Some([op, level, modifier]),
            _ => None,
        }
    }

    /// Copies `words` in starting at `offset`; returns the first address
    /// past the copied code.
    pub fn load_code(&mut self, offset: usize, words: &[Word]) -> Option<usize> {
        let end = offset.checked_add(words.len() * 3)?;
        let region = self.cells.get_mut(offset..end)?;
        for (cells, word) in region.chunks_exact_mut(3).zip(words) {
            cells.copy_from_slice(word);
        }
        Some(end)
    }

    pub fn slice(&self, from: usize, to: usize) -> &[Int] {
        let to = to.min(self.cells.len());
        let from = from.min(to);
        &self.cells[from..to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_laid_out_in_triples() {
        let mut memory = Memory::with_capacity(20);
        let end = memory.load_code(10, &[[1, 0, 5], [9, 0, 3]]).unwrap();

        assert_eq!(end, 16);
        assert_eq!(memory.fetch(10), Some([1, 0, 5]));
        assert_eq!(memory.fetch(13), Some([9, 0, 3]));
        assert_eq!(memory.load(9), Some(0));
    }

    #[test]
    fn code_must_fit() {
        let mut memory = Memory::with_capacity(12);
        assert_eq!(memory.load_code(10, &[[1, 0, 5]]), None);
    }

    #[test]
    fn out_of_range_access() {
        let mut memory = Memory::with_capacity(4);
        assert_eq!(memory.load(4), None);
        assert_eq!(memory.store(4, 1), None);
        assert_eq!(memory.fetch(2), None);
        assert_eq!(memory.store(3, 7), Some(()));
        assert_eq!(memory.slice(2, 10), &[0, 7]);
    }
}
