use crate::error::{Result, TdError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceType {
    Discrete,
    Continuous,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpaceTypeBounds {
    Discrete(usize),
    Continuous(f64, f64),
}

/// Shape of an observation or action space, one entry per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceInfo {
    pub data: Vec<SpaceTypeBounds>,
}

impl SpaceInfo {
    pub fn new(data: Vec<SpaceTypeBounds>) -> Result<Self> {
        if data.is_empty() {
            return Err(TdError::InvalidConfig("empty space".to_string()));
        }
        for bounds in data.iter() {
            match *bounds {
                SpaceTypeBounds::Discrete(0) => {
                    return Err(TdError::InvalidConfig(
                        "discrete dimension with no values".to_string(),
                    ))
                }
                SpaceTypeBounds::Continuous(low, high) if !(low <= high) => {
                    return Err(TdError::InvalidConfig(format!(
                        "continuous dimension with bounds ({}, {})",
                        low, high
                    )))
                }
                _ => {}
            }
        }
        Ok(Self { data })
    }

    pub fn discrete(n: usize) -> Result<Self> {
        Self::new(vec![SpaceTypeBounds::Discrete(n)])
    }

    pub fn continuous(low: &[f64], high: &[f64]) -> Result<Self> {
        if low.len() != high.len() {
            return Err(TdError::InvalidConfig(
                "continuous bounds of different lengths".to_string(),
            ));
        }
        Self::new(
            low.iter()
                .zip(high.iter())
                .map(|(l, h)| SpaceTypeBounds::Continuous(*l, *h))
                .collect(),
        )
    }

    pub fn get_type(&self) -> SpaceType {
        let mut is_discrete = false;
        let mut is_continuous = false;
        for i in self.data.iter() {
            match *i {
                SpaceTypeBounds::Discrete(_) => {
                    is_discrete = true;
                }
                SpaceTypeBounds::Continuous(_, _) => {
                    is_continuous = true;
                }
            };
        }
        if is_discrete && is_continuous {
            SpaceType::Mixed
        } else if is_continuous {
            SpaceType::Continuous
        } else {
            SpaceType::Discrete
        }
    }

    pub fn get_discrete_combinations(&self) -> usize {
        let mut value = 1;
        for i in self.data.iter() {
            match *i {
                SpaceTypeBounds::Discrete(n) => {
                    value *= n;
                }
                SpaceTypeBounds::Continuous(_, _) => {}
            };
        }
        value
    }

    pub fn dimensions(&self) -> usize {
        self.data.len()
    }

    /// Row-major index of a multi-dimensional discrete coordinate.
    pub fn flatten(&self, coordinates: &[usize]) -> Result<usize> {
        if self.get_type() != SpaceType::Discrete {
            return Err(TdError::Unsupported("flattening a non discrete space"));
        }
        if coordinates.len() != self.data.len() {
            return Err(TdError::InvalidConfig(format!(
                "coordinate of {} dimensions for a space of {}",
                coordinates.len(),
                self.data.len()
            )));
        }
        let mut index: usize = 0;
        for (coordinate, bounds) in coordinates.iter().zip(self.data.iter()) {
            if let SpaceTypeBounds::Discrete(n) = *bounds {
                if *coordinate >= n {
                    return Err(TdError::IndexOutOfRange {
                        kind: "coordinate",
                        index: *coordinate,
                        size: n,
                    });
                }
                index = index * n + coordinate;
            }
        }
        Ok(index)
    }
}
