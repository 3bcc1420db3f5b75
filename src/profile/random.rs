use rand::Rng;

/// Uniform selection capability used by the profile generator.
///
/// Implementations return an index in `0..len`; `len` is never zero.
pub trait Picker {
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Pick one element of `items`, or `None` when the slice is empty.
///
/// Out-of-range indices from a picker wrap around instead of panicking.
pub fn pick<'a, T>(picker: &mut dyn Picker, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let index = picker.pick_index(items.len());
    items.get(index % items.len())
}

/// Draws from the thread-local generator, so concurrent callers never share state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl Picker for ThreadRngPicker {
    fn pick_index(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Adapts any [`rand::Rng`], e.g. a seeded `StdRng` for reproducible runs.
#[derive(Debug, Clone)]
pub struct RngPicker<R>(pub R);

impl<R: Rng> Picker for RngPicker<R> {
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

/// Replays a fixed list of indices, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct SequencePicker {
    indices: Vec<usize>,
    position: usize,
}

impl SequencePicker {
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self {
            indices: indices.into(),
            position: 0,
        }
    }
}

impl Picker for SequencePicker {
    fn pick_index(&mut self, _len: usize) -> usize {
        if self.indices.is_empty() {
            return 0;
        }
        let index = self.indices[self.position % self.indices.len()];
        self.position += 1;
        index
    }
}
