use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;
use num_complex::Complex64;

use crate::geometry::elliptic::EllipticCoords;
use crate::math::mathieu::{Mathieu, MathieuError};

// Only the real part of each value enters the basis.
pub trait MathieuProvider: Send + Sync {
    fn q(&self) -> f64;

    fn max_order(&self) -> usize;

    fn ce(&self, order: usize, psi: f64) -> Result<Complex64, MathieuError>;

    fn se(&self, order: usize, psi: f64) -> Result<Complex64, MathieuError>;

    fn ke(&self, order: usize, eta: f64) -> Result<Complex64, MathieuError>;

    fn ko(&self, order: usize, eta: f64) -> Result<Complex64, MathieuError>;

    // Ko(0) is reported as zero.
    fn radial(
        &self,
        max_order: usize,
        eta: f64,
    ) -> Result<(Vec<Complex64>, Vec<Complex64>), MathieuError> {
        let even = (0..=max_order)
            .map(|m| self.ke(m, eta))
            .collect::<Result<Vec<_>, _>>()?;
        let odd = (0..=max_order)
            .map(|m| {
                if m == 0 {
                    Ok(Complex64::new(0.0, 0.0))
                } else {
                    self.ko(m, eta)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((even, odd))
    }
}

type ProviderFactory =
    dyn Fn(f64) -> Result<Arc<dyn MathieuProvider>, MathieuError> + Send + Sync;

// Built at most once per distinct q.
pub struct ProviderCache {
    factory: Box<ProviderFactory>,
    providers: RwLock<HashMap<u64, Arc<dyn MathieuProvider>>>,
}

impl ProviderCache {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(f64) -> Result<Arc<dyn MathieuProvider>, MathieuError> + Send + Sync + 'static,
    {
        ProviderCache {
            factory: Box::new(factory),
            providers: RwLock::new(HashMap::new()),
        }
    }

    pub fn native() -> Self {
        Self::new(|q| Ok(Arc::new(Mathieu::new(q)?) as Arc<dyn MathieuProvider>))
    }

    pub fn get(&self, q: f64) -> Result<Arc<dyn MathieuProvider>, MathieuError> {
        let key = q.to_bits();
        if let Some(provider) = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(provider.clone());
        }

        // Re-check under the write lock: another caller may have built it.
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match providers.entry(key) {
            Entry::Occupied(e) => Ok(e.get().clone()),
            Entry::Vacant(e) => {
                debug!("Building Mathieu provider for q={}", q);
                let provider = (self.factory)(q)?;
                e.insert(provider.clone());
                Ok(provider)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasisTerm {
    pub order: usize,
    pub parity: Parity,
}

impl BasisTerm {
    // [0 even, 1 odd, 1 even, 2 odd, 2 even, ...]
    pub fn index(&self) -> usize {
        match (self.order, self.parity) {
            (0, _) => 0,
            (order, Parity::Odd) => 2 * order - 1,
            (order, Parity::Even) => 2 * order,
        }
    }
}

pub fn basis_len(num_terms: usize) -> usize {
    (2 * num_terms).saturating_sub(1)
}

/// Basis terms in block order, shared by system assembly and field evaluation.
pub fn basis_terms(num_terms: usize) -> impl Iterator<Item = BasisTerm> {
    std::iter::once(BasisTerm {
        order: 0,
        parity: Parity::Even,
    })
    .chain((1..num_terms).flat_map(|order| {
        [Parity::Odd, Parity::Even]
            .into_iter()
            .map(move |parity| BasisTerm { order, parity })
    }))
}

pub struct MathieuBasis {
    cache: ProviderCache,
    num_terms: usize,
}

impl MathieuBasis {
    pub fn new(cache: ProviderCache, num_terms: usize) -> Self {
        MathieuBasis { cache, num_terms }
    }

    pub fn native(num_terms: usize) -> Self {
        Self::new(ProviderCache::native(), num_terms)
    }

    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    pub fn len(&self) -> usize {
        basis_len(self.num_terms)
    }

    pub fn is_empty(&self) -> bool {
        self.num_terms == 0
    }

    pub fn cache(&self) -> &ProviderCache {
        &self.cache
    }

    pub fn order_zero(&self, q: f64, coords: EllipticCoords) -> Result<f64, MathieuError> {
        let m = self.cache.get(q)?;
        Ok(m.ce(0, coords.psi)?.re * m.ke(0, coords.eta)?.re)
    }

    // (odd, even) for order >= 1.
    pub fn order_pair(
        &self,
        q: f64,
        order: usize,
        coords: EllipticCoords,
    ) -> Result<(f64, f64), MathieuError> {
        let m = self.cache.get(q)?;
        let odd = m.se(order, coords.psi)?.re * m.ko(order, coords.eta)?.re;
        let even = m.ce(order, coords.psi)?.re * m.ke(order, coords.eta)?.re;
        Ok((odd, even))
    }

    pub fn extend_terms(
        &self,
        q: f64,
        coords: EllipticCoords,
        out: &mut Vec<f64>,
    ) -> Result<(), MathieuError> {
        let m = self.cache.get(q)?;
        let max_order = self.num_terms.saturating_sub(1);
        if max_order > m.max_order() {
            return Err(MathieuError::OrderOutOfRange {
                order: max_order,
                max_order: m.max_order(),
            });
        }
        let (ke, ko) = m.radial(max_order, coords.eta)?;
        for term in basis_terms(self.num_terms) {
            let value = match term.parity {
                Parity::Even => m.ce(term.order, coords.psi)?.re * ke[term.order].re,
                Parity::Odd => m.se(term.order, coords.psi)?.re * ko[term.order].re,
            };
            out.push(value);
        }
        Ok(())
    }

    pub fn terms(&self, q: f64, coords: EllipticCoords) -> Result<Vec<f64>, MathieuError> {
        let mut out = Vec::with_capacity(self.len());
        self.extend_terms(q, coords, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::testing::TrigProvider;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_cache(counter: Arc<AtomicUsize>) -> ProviderCache {
        ProviderCache::new(move |q| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(TrigProvider { q }) as Arc<dyn MathieuProvider>)
        })
    }

    #[test]
    fn test_term_order() {
        let terms: Vec<BasisTerm> = basis_terms(3).collect();
        assert_eq!(terms.len(), basis_len(3));
        let expected = [
            (0, Parity::Even),
            (1, Parity::Odd),
            (1, Parity::Even),
            (2, Parity::Odd),
            (2, Parity::Even),
        ];
        for (i, (term, (order, parity))) in terms.iter().zip(expected).enumerate() {
            assert_eq!(term.order, order);
            assert_eq!(term.parity, parity);
            assert_eq!(term.index(), i);
        }
        assert_eq!(basis_terms(1).count(), 1);
    }

    #[test]
    fn test_terms_match_order_functions() {
        let basis = MathieuBasis::native(4);
        let coords = EllipticCoords { eta: 0.6, psi: 2.1 };
        let q = -0.8;
        let terms = basis.terms(q, coords).unwrap();
        assert_eq!(terms.len(), 7);
        assert_relative_eq!(terms[0], basis.order_zero(q, coords).unwrap(), max_relative = 1e-12);
        for order in 1..4 {
            let (odd, even) = basis.order_pair(q, order, coords).unwrap();
            assert_relative_eq!(terms[2 * order - 1], odd, max_relative = 1e-12);
            assert_relative_eq!(terms[2 * order], even, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_cache_builds_once_per_parameter() {
        let counter = Arc::new(AtomicUsize::new(0));
        let cache = counting_cache(counter.clone());
        for _ in 0..5 {
            cache.get(-0.5).unwrap();
            cache.get(-1.5).unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_concurrent_access() {
        let counter = Arc::new(AtomicUsize::new(0));
        let cache = counting_cache(counter.clone());
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        assert_eq!(cache.get(-0.25).unwrap().q(), -0.25);
                    }
                });
            }
        });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_parameter_is_not_cached() {
        let cache = ProviderCache::native();
        assert!(cache.get(1.0).is_err());
        assert!(cache.is_empty());
    }
}
