//! Min-max scaling helper shared by the prior and relatedness models

/// Observed range of a set of values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Range of the values, `None` when there are none
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(MinMax { min: v, max: v }),
            Some(r) => Some(MinMax { min: r.min.min(v), max: r.max.max(v) }),
        })
    }

    /// An empty range cannot be scaled
    pub fn is_degenerate(&self) -> bool {
        !(self.max > self.min)
    }

    /// Scale into [0, 1]; `None` for a degenerate range
    pub fn scale(&self, value: f64) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        Some(((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_and_scale() {
        let range = MinMax::from_values([2.0, 4.0, 3.0]).unwrap();
        assert_eq!(range, MinMax { min: 2.0, max: 4.0 });
        assert_eq!(range.scale(3.0), Some(0.5));
        assert_eq!(range.scale(4.0), Some(1.0));
    }

    #[test]
    fn test_degenerate_range() {
        assert!(MinMax::from_values(Vec::<f64>::new()).is_none());
        let flat = MinMax::from_values([1.5, 1.5]).unwrap();
        assert!(flat.is_degenerate());
        assert_eq!(flat.scale(1.5), None);
    }
}
