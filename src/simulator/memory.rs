use super::error::FaultKind;

/// Word-addressed memory. It starts out as a copy of the loaded program, so instructions and data
/// share one address space, and every access is bounds checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    words: Vec<i32>,
}

impl Memory {
    pub fn new(words: Vec<i32>) -> Self {
        Self { words }
    }

    /// Pads the memory with zeroes up to `size` words. Never shrinks it.
    pub fn grow_to(&mut self, size: usize) {
        if size > self.words.len() {
            self.words.resize(size, 0);
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[i32] {
        &self.words
    }

    fn index(&self, address: i64) -> Result<usize, FaultKind> {
        match usize::try_from(address) {
            Ok(i) if i < self.words.len() => Ok(i),
            _ => Err(FaultKind::MemoryOutOfBounds {
                address,
                len: self.words.len(),
            }),
        }
    }

    pub fn get_word(&self, address: i64) -> Result<i32, FaultKind> {
        self.index(address).map(|i| self.words[i])
    }

    pub fn set_word(&mut self, address: i64, value: i32) -> Result<(), FaultKind> {
        let i = self.index(address)?;
        self.words[i] = value;
        Ok(())
    }
}
