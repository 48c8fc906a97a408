use serde::{Deserialize, Serialize};

/// A list of items with relative randomness weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct WeightedList<T> {
    /// Entries in the list.
    pub items: Vec<WeightedEntry<T>>,
}

impl<T> Default for WeightedList<T> {
    fn default() -> Self { Self { items: Vec::new() } }
}

impl<T, I> From<I> for WeightedList<T>
where
    I: IntoIterator<Item = (T, f32)>,
{
    fn from(value: I) -> Self {
        Self {
            items: value.into_iter().map(|(item, weight)| WeightedEntry { item, weight }).collect(),
        }
    }
}

impl<T> WeightedList<T> {
    /// Creates a list where `usual` has weight `usual_weight`
    /// and the remaining weight is split evenly among `others`.
    pub fn usually(usual: T, usual_weight: f32, others: impl IntoIterator<Item = T>) -> Self {
        let others: Vec<T> = others.into_iter().collect();
        #[expect(clippy::cast_precision_loss, reason = "lists are short")]
        let other_weight = (1.0 - usual_weight) / others.len().max(1) as f32;
        Self::from(
            [(usual, usual_weight)]
                .into_iter()
                .chain(others.into_iter().map(|item| (item, other_weight))),
        )
    }

    /// Iterates over the items regardless of weight.
    pub fn iter(&self) -> impl Iterator<Item = &T> { self.items.iter().map(|entry| &entry.item) }

    /// Samples a random item from the list according to the weights.
    ///
    /// Falls back to the first item if no item has positive weight.
    pub fn sample<'a>(&'a self, rng: &mut impl rand::Rng) -> Option<&'a T> {
        let total_weight: f32 = self.items.iter().map(|entry| entry.weight).sum();
        if total_weight <= 0.0 {
            return self.items.first().map(|entry| &entry.item);
        }

        let mut choice = rng.random_range(0.0..total_weight);
        for entry in &self.items {
            if choice < entry.weight {
                return Some(&entry.item);
            }
            choice -= entry.weight;
        }
        self.items.last().map(|entry| &entry.item)
    }
}

/// An entry in a [`WeightedList`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct WeightedEntry<T> {
    /// The item for this entry.
    pub item:   T,
    /// The relative weight of this entry.
    /// Must be non-negative.
    pub weight: f32,
}
