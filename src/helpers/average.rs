#[derive(Default, Copy, Clone)]
pub struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Mean of the pushed values, `None` when nothing has been pushed.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        (self.count != 0).then(|| self.sum / self.count as f64)
    }
}

impl FromIterator<f64> for Average {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut average = Self::default();
        for value in iter {
            average.push(value);
        }
        average
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_ok() {
        assert_eq!([100.0, 300.0].into_iter().collect::<Average>().average(), Some(200.0));
    }

    #[test]
    fn empty_average_ok() {
        assert_eq!(Average::default().average(), None);
    }
}
