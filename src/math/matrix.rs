use rand::prelude::*;
use std::f32::consts::PI;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Dense row-major f32 matrix. The single numeric container for weights,
/// biases, activations, and gradients.
///
/// Vectors are represented as single-column matrices (n, 1).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix from nested rows. Panics if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Matrix {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in &rows {
            assert_eq!(row.len(), n_cols, "all rows must have equal length");
            data.extend_from_slice(row);
        }
        Matrix {
            rows: n_rows,
            cols: n_cols,
            data,
        }
    }

    /// Builds a single-column matrix (n, 1) from a value vector.
    pub fn column(values: Vec<f32>) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values,
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both u1 and u2 must be uniform on (0, 1].
    fn sample_standard_normal(rng: &mut ThreadRng) -> f32 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f32 = 1.0 - rng.gen::<f32>();
        let u2: f32 = 1.0 - rng.gen::<f32>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: samples from N(0, sqrt(2 / cols)).
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    ///
    /// Shape: (rows, cols). `cols` is the fan-in (number of input connections).
    pub fn he(rows: usize, cols: usize) -> Matrix {
        let mut rng = rand::thread_rng();
        let std_dev = (2.0 / cols as f32).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for x in res.data.iter_mut() {
            *x = Matrix::sample_standard_normal(&mut rng) * std_dev;
        }
        res
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / cols)).
    ///
    /// Recommended before Identity layers. Keeps the variance of activations
    /// and gradients roughly equal across layers.
    ///
    /// Shape: (rows, cols). `cols` is the fan-in (number of input connections).
    pub fn xavier(rows: usize, cols: usize) -> Matrix {
        let mut rng = rand::thread_rng();
        let std_dev = (1.0 / cols as f32).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for x in res.data.iter_mut() {
            *x = Matrix::sample_standard_normal(&mut rng) * std_dev;
        }
        res
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i * res.cols + j] = self.get(j, i);
            }
        }
        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f32) -> f32,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.rows, rhs.rows, "Matrices are of incorrect sizes");
        assert_eq!(self.cols, rhs.cols, "Matrices are of incorrect sizes");
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(x, y)| x * y)
                .collect(),
        }
    }

    /// Contents as nested rows, outer Vec indexed by row.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.data.chunks(self.cols).map(|row| row.to_vec()).collect()
    }

    /// Contents of a single-column matrix as a flat vector.
    pub fn to_column_vec(&self) -> Vec<f32> {
        assert_eq!(self.cols, 1, "to_column_vec requires a (n, 1) matrix");
        self.data.clone()
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Matrix {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(a, b)| a + b)
                .collect(),
        }
    }
}

impl AddAssign<&Matrix> for Matrix {
    fn add_assign(&mut self, rhs: &Matrix) {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }
        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a += b;
        }
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Matrix {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(a, b)| a - b)
                .collect(),
        }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Matrix {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.get(i, k) * rhs.get(k, j);
                }
                res.data[i * res.cols + j] = sum;
            }
        }

        res
    }
}
