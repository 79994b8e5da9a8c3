use spec_math::Bessel;

const RESCALE_ABOVE: f64 = 1e250;

// Miller's downward recurrence, scaled to match I_0(x).
pub fn bessel_i_sequence(n_max: usize, x: f64) -> Vec<f64> {
    let mut result = vec![0.0; n_max + 1];
    if x == 0.0 {
        result[0] = 1.0;
        return result;
    }

    let start = 2 * (n_max + ((40 * (n_max + 1)) as f64).sqrt() as usize)
        + 2 * (x.ceil() as usize)
        + 20;

    let mut values = vec![0.0; start + 2];
    values[start] = 1.0;
    for k in (1..=start).rev() {
        values[k - 1] = (2 * k) as f64 / x * values[k] + values[k + 1];
        if values[k - 1] > RESCALE_ABOVE {
            for v in values[k - 1..].iter_mut() {
                *v /= RESCALE_ABOVE;
            }
        }
    }

    let scale = x.bessel_i0() / values[0];
    for (r, v) in result.iter_mut().zip(values.iter()) {
        *r = v * scale;
    }
    result
}

// Upward recurrence, stable for K. Large orders at small x overflow to inf.
pub fn bessel_k_sequence(n_max: usize, x: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(n_max + 1);
    result.push(x.bessel_k0());
    if n_max == 0 {
        return result;
    }
    result.push(x.bessel_k1());
    for k in 1..n_max {
        let next = result[k - 1] + (2 * k) as f64 / x * result[k];
        result.push(next);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use spec_math::Bessel;

    #[test]
    fn test_i_reference_values() {
        let i = bessel_i_sequence(2, 1.0);
        assert_relative_eq!(i[0], 1.2660658777520082, max_relative = 1e-12);
        assert_relative_eq!(i[1], 0.5651591039924851, max_relative = 1e-12);
        let i = bessel_i_sequence(3, 2.0);
        assert_relative_eq!(i[2], 0.6889484476987382, max_relative = 1e-12);
    }

    #[test]
    fn test_k_reference_values() {
        let k = bessel_k_sequence(1, 1.0);
        assert_relative_eq!(k[0], 0.42102443824070834, max_relative = 1e-12);
        assert_relative_eq!(k[1], 0.6019072301972346, max_relative = 1e-12);
        assert_relative_eq!(bessel_k_sequence(0, 0.1)[0], 2.4270690247020164, max_relative = 1e-12);
        assert_relative_eq!(bessel_k_sequence(2, 2.0)[2], 0.2537597545660559, max_relative = 1e-12);
    }

    #[test]
    fn test_wronskian() {
        // I_n K_{n+1} + I_{n+1} K_n = 1 / x
        for &x in &[0.05, 0.3, 1.0, 4.5, 12.0] {
            let i = bessel_i_sequence(10, x);
            let k = bessel_k_sequence(10, x);
            for n in 0..10 {
                let w = i[n] * k[n + 1] + i[n + 1] * k[n];
                assert_relative_eq!(w, 1.0 / x, max_relative = 1e-10);
            }
        }
    }

    #[test]
    fn test_sequences_match_direct_values() {
        let x = 0.7;
        let i = bessel_i_sequence(1, x);
        assert_relative_eq!(i[1], x.bessel_i1(), max_relative = 1e-12);
        let k = bessel_k_sequence(5, x);
        assert_relative_eq!(k[5], x.bessel_kn(5), max_relative = 1e-10);
    }

    #[test]
    fn test_zero_argument() {
        assert_eq!(bessel_i_sequence(3, 0.0), vec![1.0, 0.0, 0.0, 0.0]);
    }
}
