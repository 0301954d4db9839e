//! Operator sugar for building [`LinearCombination`](super::LinearCombination)s
//! ergonomically, e.g. `x0 * g0 + x1 * g1`.

use core::ops::{Add, Mul, Neg, Sub};

use super::{GroupVar, ScalarVar, Sum, Term};

mod add {
    use super::*;

    macro_rules! impl_add_term {
        ($($type:ty),+) => {
            $(
            impl Add<$type> for $type {
                type Output = Sum<$type>;

                fn add(self, rhs: $type) -> Self::Output {
                    Sum(vec![self, rhs])
                }
            }
            )+
        };
    }

    impl_add_term!(ScalarVar, GroupVar, Term);

    impl<T> Add<T> for Sum<T> {
        type Output = Sum<T>;

        fn add(mut self, rhs: T) -> Self::Output {
            self.0.push(rhs);
            self
        }
    }

    macro_rules! impl_add_sum_term {
        ($($type:ty),+) => {
            $(
            impl Add<Sum<$type>> for $type {
                type Output = Sum<$type>;

                fn add(self, rhs: Sum<$type>) -> Self::Output {
                    rhs + self
                }
            }
            )+
        };
    }

    impl_add_sum_term!(ScalarVar, GroupVar, Term);

    impl<T> Add<Sum<T>> for Sum<T> {
        type Output = Sum<T>;

        fn add(mut self, rhs: Sum<T>) -> Self::Output {
            self.0.extend(rhs.0);
            self
        }
    }
}

mod mul {
    use super::*;

    impl Mul<ScalarVar> for GroupVar {
        type Output = Term;

        /// Multiply a [GroupVar] by a [ScalarVar] to form a new [Term].
        fn mul(self, rhs: ScalarVar) -> Term {
            Term {
                elem: self,
                scalar: rhs,
            }
        }
    }

    impl Mul<GroupVar> for ScalarVar {
        type Output = Term;

        /// Multiply a [ScalarVar] by a [GroupVar] to form a new [Term].
        fn mul(self, rhs: GroupVar) -> Term {
            rhs * self
        }
    }

    impl<Rhs: Clone, Lhs: Mul<Rhs>> Mul<Rhs> for Sum<Lhs> {
        type Output = Sum<<Lhs as Mul<Rhs>>::Output>;

        /// Multiplication of the sum by a term, implemented as a general distributive property.
        fn mul(self, rhs: Rhs) -> Self::Output {
            Sum(self.0.into_iter().map(|x| x * rhs.clone()).collect())
        }
    }
}

mod neg {
    use super::*;

    impl<T: Neg> Neg for Sum<T> {
        type Output = Sum<<T as Neg>::Output>;

        /// Negation a sum, implemented as a general distributive property.
        fn neg(self) -> Self::Output {
            Sum(self.0.into_iter().map(|x| x.neg()).collect())
        }
    }
}

mod sub {
    use super::*;

    impl<T, Rhs> Sub<Rhs> for Sum<T>
    where
        Rhs: Neg,
        <Rhs as Neg>::Output: Add<Self>,
    {
        type Output = <<Rhs as Neg>::Output as Add<Self>>::Output;

        #[allow(clippy::suspicious_arithmetic_impl)]
        fn sub(self, rhs: Rhs) -> Self::Output {
            rhs.neg() + self
        }
    }
}
