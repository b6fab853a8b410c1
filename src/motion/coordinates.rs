//! Positional arguments accepted by motion commands.
//!
//! Callers decide at the API boundary whether they pass one (possibly
//! partial) triple or a batch of full rows; shape checks happen here, before
//! any command touches the motion state.

use crate::error::GcodeError;

use super::Position;

/// One set of optional axis operands. Omitted axes are never written.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Axes {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl Axes {
    pub fn new(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        Axes { x, y, z }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Axes::new(Some(x), Some(y), Some(z))
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }

    /// Axis letters paired with their operands, in X Y Z order.
    pub fn words(&self) -> [(char, Option<f64>); 3] {
        [('X', self.x), ('Y', self.y), ('Z', self.z)]
    }
}

impl From<Position> for Axes {
    fn from(p: Position) -> Self {
        Axes::xyz(p.x, p.y, p.z)
    }
}

/// Scalar-or-batch positional input for `G0`/`G1` style commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
    /// A single move; any subset of axes may be present.
    Scalar(Axes),
    /// One move per row, processed in row order.
    Batch(Vec<Position>),
}

impl Coordinates {
    /// No positional operands (speed/extrusion-only lines).
    pub fn none() -> Self {
        Coordinates::Scalar(Axes::default())
    }

    pub fn scalar(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        Coordinates::Scalar(Axes::new(x, y, z))
    }

    pub fn point(x: f64, y: f64, z: f64) -> Self {
        Coordinates::Scalar(Axes::xyz(x, y, z))
    }

    pub fn batch(rows: Vec<Position>) -> Self {
        Coordinates::Batch(rows)
    }

    /// Builds a batch from per-axis columns.
    ///
    /// Returns [`GcodeError::ArgumentLengthMismatch`] when the columns differ
    /// in length.
    pub fn from_columns(xs: &[f64], ys: &[f64], zs: &[f64]) -> Result<Self, GcodeError> {
        if xs.len() != ys.len() || xs.len() != zs.len() {
            return Err(GcodeError::ArgumentLengthMismatch {
                x: xs.len(),
                y: ys.len(),
                z: zs.len(),
            });
        }
        let rows = xs
            .iter()
            .zip(ys)
            .zip(zs)
            .map(|((&x, &y), &z)| Position::new(x, y, z))
            .collect();
        Ok(Coordinates::Batch(rows))
    }

    /// Builds a batch from an `(n, 3)` table.
    ///
    /// Returns [`GcodeError::InvalidBatchShape`] if any row is not exactly
    /// three wide.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, GcodeError> {
        let mut positions = Vec::with_capacity(rows.len());
        for row in rows {
            match row.as_ref() {
                &[x, y, z] => positions.push(Position::new(x, y, z)),
                other => {
                    return Err(GcodeError::InvalidBatchShape {
                        expected: "(n, 3)".to_string(),
                        found: format!("({}, {})", rows.len(), other.len()),
                    })
                }
            }
        }
        Ok(Coordinates::Batch(positions))
    }

    /// Reads a flat `(3,)` array as one full triple.
    pub fn from_flat(values: &[f64]) -> Result<Self, GcodeError> {
        match values {
            &[x, y, z] => Ok(Coordinates::point(x, y, z)),
            _ => Err(GcodeError::InvalidBatchShape {
                expected: "(3,)".to_string(),
                found: format!("({},)", values.len()),
            }),
        }
    }

    /// Expands into one [`Axes`] per emitted line.
    pub fn rows(&self) -> Vec<Axes> {
        match self {
            Coordinates::Scalar(axes) => vec![*axes],
            Coordinates::Batch(rows) => rows.iter().map(|&p| Axes::from(p)).collect(),
        }
    }
}

impl From<Axes> for Coordinates {
    fn from(axes: Axes) -> Self {
        Coordinates::Scalar(axes)
    }
}

impl From<Position> for Coordinates {
    fn from(p: Position) -> Self {
        Coordinates::Scalar(Axes::from(p))
    }
}

impl From<Vec<Position>> for Coordinates {
    fn from(rows: Vec<Position>) -> Self {
        Coordinates::Batch(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_of_equal_length_become_rows() {
        let c = Coordinates::from_columns(&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]).unwrap();
        assert_eq!(
            c,
            Coordinates::Batch(vec![
                Position::new(1.0, 3.0, 5.0),
                Position::new(2.0, 4.0, 6.0)
            ])
        );
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let err = Coordinates::from_columns(&[1.0, 2.0], &[3.0], &[5.0, 6.0]).unwrap_err();
        assert_eq!(err, GcodeError::ArgumentLengthMismatch { x: 2, y: 1, z: 2 });
    }

    #[test]
    fn table_rows_must_be_three_wide() {
        let ok = Coordinates::from_rows(&[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]]).unwrap();
        assert_eq!(ok.rows().len(), 2);

        let bad: Vec<Vec<f64>> = vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0]];
        let err = Coordinates::from_rows(&bad).unwrap_err();
        assert!(matches!(err, GcodeError::InvalidBatchShape { .. }));
        assert!(err.to_string().contains("(2, 2)"), "got: {err}");
    }

    #[test]
    fn flat_triple_is_a_scalar_point() {
        assert_eq!(
            Coordinates::from_flat(&[1.0, 2.0, 3.0]).unwrap(),
            Coordinates::point(1.0, 2.0, 3.0)
        );
        assert!(matches!(
            Coordinates::from_flat(&[1.0, 2.0]),
            Err(GcodeError::InvalidBatchShape { .. })
        ));
    }

    #[test]
    fn scalar_expands_to_one_row() {
        let rows = Coordinates::scalar(Some(1.0), None, None).rows();
        assert_eq!(rows, vec![Axes::new(Some(1.0), None, None)]);
    }

    #[test]
    fn empty_batch_expands_to_no_rows() {
        assert!(Coordinates::batch(vec![]).rows().is_empty());
    }
}
