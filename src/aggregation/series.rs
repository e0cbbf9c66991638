use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint<K> {
    pub key: K,
    pub average: f64,
}

/// Per-group mean prices, ordered by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregateSeries<K> {
    pub points: Vec<SeriesPoint<K>>,
}

impl<K: PartialEq> AggregateSeries<K> {
    pub fn position(&self, key: &K) -> Option<usize> {
        self.points.iter().position(|point| &point.key == key)
    }

    pub fn get(&self, key: &K) -> Option<f64> {
        self.position(key).map(|index| self.points[index].average)
    }
}

impl<K> FromIterator<(K, f64)> for AggregateSeries<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().map(|(key, average)| SeriesPoint { key, average }).collect(),
        }
    }
}
