//! The complex nodal system G·v = i.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex;

/// Nodal system at a single angular frequency.
///
/// `matrix` is the N×N complex conductance matrix over the non-ground node
/// voltages and `rhs` the excitation (current) vector. All stamp helpers are
/// additive except [`replace_voltage_row`](Self::replace_voltage_row), which
/// implements the ideal-voltage-source row replacement and must therefore be
/// applied after every additive stamp.
#[derive(Debug, Clone)]
pub struct NodalSystem {
    matrix: DMatrix<Complex<f64>>,
    rhs: DVector<Complex<f64>>,
    num_nodes: usize,
}

impl NodalSystem {
    /// Create a zeroed system for a circuit with `num_nodes` non-ground nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            matrix: DMatrix::from_element(num_nodes, num_nodes, Complex::new(0.0, 0.0)),
            rhs: DVector::from_element(num_nodes, Complex::new(0.0, 0.0)),
            num_nodes,
        }
    }

    /// Number of non-ground nodes (the system dimension).
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// The conductance matrix.
    pub fn matrix(&self) -> &DMatrix<Complex<f64>> {
        &self.matrix
    }

    /// The excitation vector.
    pub fn rhs(&self) -> &DVector<Complex<f64>> {
        &self.rhs
    }

    /// Clear the matrix and excitation to zeros.
    pub fn clear(&mut self) {
        self.matrix.fill(Complex::new(0.0, 0.0));
        self.rhs.fill(Complex::new(0.0, 0.0));
    }

    /// Add a value to the conductance matrix at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: Complex<f64>) {
        self.matrix[(row, col)] += value;
    }

    /// Add a value to the excitation vector at the given row.
    pub fn add_rhs(&mut self, row: usize, value: Complex<f64>) {
        self.rhs[row] += value;
    }

    /// Stamp a two-terminal admittance between two nodes.
    ///
    /// For an admittance Y between nodes i and j (current from i to j is
    /// `Y·(Vi − Vj)`):
    ///   G\[i,i\] += Y,  G\[j,j\] += Y,  G\[i,j\] -= Y,  G\[j,i\] -= Y
    ///
    /// `None` stands for the ground node; its row and column are skipped.
    pub fn stamp_admittance(
        &mut self,
        node_i: Option<usize>,
        node_j: Option<usize>,
        y: Complex<f64>,
    ) {
        if let Some(i) = node_i {
            self.add(i, i, y);
        }
        if let Some(j) = node_j {
            self.add(j, j, y);
        }
        if let (Some(i), Some(j)) = (node_i, node_j) {
            self.add(i, j, -y);
            self.add(j, i, -y);
        }
    }

    /// Stamp a real conductance between two nodes.
    pub fn stamp_conductance(&mut self, node_i: Option<usize>, node_j: Option<usize>, g: f64) {
        self.stamp_admittance(node_i, node_j, Complex::new(g, 0.0));
    }

    /// Stamp an independent current source.
    ///
    /// The source draws the phasor current from `node_from` and injects it at
    /// `node_to`: `I[from] -= Ĩ`, `I[to] += Ĩ`.
    pub fn stamp_current_source(
        &mut self,
        node_from: Option<usize>,
        node_to: Option<usize>,
        current: Complex<f64>,
    ) {
        if let Some(f) = node_from {
            self.add_rhs(f, -current);
        }
        if let Some(t) = node_to {
            self.add_rhs(t, current);
        }
    }

    /// Stamp a transconductance: current `gm·(V(ctrl+) − V(ctrl−))` flowing
    /// from `out_pos` to `out_neg`.
    ///
    ///   G\[a,c\] += gm,  G\[a,d\] -= gm,  G\[b,c\] -= gm,  G\[b,d\] += gm
    pub fn stamp_transconductance(
        &mut self,
        out_pos: Option<usize>,
        out_neg: Option<usize>,
        ctrl_pos: Option<usize>,
        ctrl_neg: Option<usize>,
        gm: f64,
    ) {
        let gm = Complex::new(gm, 0.0);
        if let Some(a) = out_pos {
            if let Some(c) = ctrl_pos {
                self.add(a, c, gm);
            }
            if let Some(d) = ctrl_neg {
                self.add(a, d, -gm);
            }
        }
        if let Some(b) = out_neg {
            if let Some(c) = ctrl_pos {
                self.add(b, c, -gm);
            }
            if let Some(d) = ctrl_neg {
                self.add(b, d, gm);
            }
        }
    }

    /// Replace a KCL row with an ideal voltage-source constraint.
    ///
    /// Zeros `row`, writes ±1 into the columns of the source terminals and
    /// sets the excitation entry to the source phasor. For a source with its
    /// positive terminal grounded the caller passes the negative terminal's
    /// row together with a `-1` coefficient via `node_pos = None`.
    pub fn replace_voltage_row(
        &mut self,
        row: usize,
        node_pos: Option<usize>,
        node_neg: Option<usize>,
        voltage: Complex<f64>,
    ) {
        self.matrix.row_mut(row).fill(Complex::new(0.0, 0.0));
        if let Some(p) = node_pos {
            self.matrix[(row, p)] = Complex::new(1.0, 0.0);
        }
        if let Some(n) = node_neg {
            self.matrix[(row, n)] = Complex::new(-1.0, 0.0);
        }
        self.rhs[row] = voltage;
    }
}
