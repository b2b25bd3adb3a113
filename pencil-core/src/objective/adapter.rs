use super::traits::Objective;
use crate::problem::{ManifoldPoint, Pencil, TangentVector};

/// Distance-to-stable-pencil objective for a fixed pencil.
#[derive(Debug, Clone, Copy)]
pub struct PencilObjective<'a> {
    pencil: &'a Pencil,
}

impl<'a> PencilObjective<'a> {
    pub fn new(pencil: &'a Pencil) -> Self {
        Self { pencil }
    }

    pub fn pencil(&self) -> &Pencil {
        self.pencil
    }
}

impl Objective for PencilObjective<'_> {
    type Point = ManifoldPoint;
    type Tangent = TangentVector;

    fn cost(&self, x: &ManifoldPoint) -> f64 {
        super::cost::cost(self.pencil, x)
    }

    fn egrad(&self, x: &ManifoldPoint) -> TangentVector {
        super::gradient::egrad(self.pencil, x)
    }

    fn ehess(&self, x: &ManifoldPoint, u: &TangentVector) -> TangentVector {
        super::hessian::ehess(self.pencil, x, u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::dense::from_real_rows;

    #[test]
    fn test_adapter_forwards_to_evaluators() {
        let a = from_real_rows(2, &[1.0, 0.0, 0.0, 1.0]);
        let b = from_real_rows(2, &[0.0, 1.0, 1.0, 0.0]);
        let pencil = Pencil::new(a, b).unwrap();
        let obj = PencilObjective::new(&pencil);
        let x = ManifoldPoint::identity(2);

        assert_eq!(obj.cost(&x), crate::objective::cost(&pencil, &x));
        assert_eq!(obj.egrad(&x), crate::objective::egrad(&pencil, &x));
        let u = obj.egrad(&x);
        assert_eq!(obj.ehess(&x, &u), crate::objective::ehess(&pencil, &x, &u));
        assert_eq!(obj.pencil().dim(), 2);
    }
}
