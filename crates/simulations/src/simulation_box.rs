//! Periodic simulation volumes

// external crates
use log::warn;
use serde::{Deserialize, Serialize};

/// Dimensions of a simulation volume
///
/// ```rust
/// # use galtools_simulations::SimulationBox;
/// let cube = SimulationBox::cube(100.0, "Mpc/h");
/// let (x, y, z) = cube.wrap(&[-5.0], &[50.0], &[105.0]);
///
/// assert_eq!(x, vec![95.0]);
/// assert_eq!(y, vec![50.0]);
/// assert_eq!(z, vec![5.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationBox {
    /// Side lengths along x, y and z
    pub size: [f64; 3],
    pub units: Option<String>,
    pub periodic: bool,
}

impl SimulationBox {
    /// A periodic cube
    pub fn cube(size: f64, units: &str) -> Self {
        Self {
            size: [size; 3],
            units: Some(units.to_string()),
            periodic: true,
        }
    }

    /// Map positions that fall just outside the box back inside it
    ///
    /// Values below zero gain one box length and values above the box
    /// length lose one. Inputs are never modified, and positions are
    /// returned unchanged for non-periodic boxes.
    pub fn wrap(&self, x: &[f64], y: &[f64], z: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        if !self.periodic {
            warn!("Cannot wrap positions, simulation box is not periodic");
            return (x.to_vec(), y.to_vec(), z.to_vec());
        }
        (
            self.wrap_dimension(0, x),
            self.wrap_dimension(1, y),
            self.wrap_dimension(2, z),
        )
    }

    fn wrap_dimension(&self, axis: usize, values: &[f64]) -> Vec<f64> {
        let length = self.size[axis];
        values
            .iter()
            .map(|v| match *v {
                v if v < 0.0 => v + length,
                v if v > length => v - length,
                v => v,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_periodic_boxes_are_untouched() {
        let mut cube = SimulationBox::cube(10.0, "Mpc");
        cube.periodic = false;
        let (x, _, _) = cube.wrap(&[-1.0, 11.0], &[0.0, 0.0], &[0.0, 0.0]);
        assert_eq!(x, vec![-1.0, 11.0]);
    }

    #[test]
    fn axes_wrap_independently() {
        let cuboid = SimulationBox {
            size: [10.0, 20.0, 30.0],
            units: None,
            periodic: true,
        };
        let (x, y, z) = cuboid.wrap(&[12.0], &[12.0], &[-12.0]);
        assert_eq!((x[0], y[0], z[0]), (2.0, 12.0, 18.0));
    }
}
