//! Galois-field arithmetic and Reed–Solomon codecs over GF(2^8), shared by
//! the encoder (systematic generation) and the decoder (syndrome
//! computation and error correction). Primitive polynomial 0x11D.

use std::sync::OnceLock;

struct Tables {
    exp: [u8; 512], // doubled so exp[i] for i in 0..255 can be read without a modulo on the hot path
    log: [u8; 256],
}

static TABLES: OnceLock<Tables> = OnceLock::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(|| {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];
        let mut x: u32 = 1;
        for i in 0..255usize {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= 0x11D;
            }
        }
        for i in 255..512 {
            exp[i] = exp[i - 255];
        }
        Tables { exp, log }
    })
}

/// Multiplies two field elements.
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    let i = usize::from(t.log[a as usize]) + usize::from(t.log[b as usize]);
    t.exp[i]
}

/// Divides `a` by `b`. Panics if `b` is zero.
pub fn div(a: u8, b: u8) -> u8 {
    assert!(b != 0, "division by zero in GF(256)");
    if a == 0 {
        return 0;
    }
    let t = tables();
    let diff = 255 + usize::from(t.log[a as usize]) - usize::from(t.log[b as usize]);
    t.exp[diff % 255]
}

/// Raises a field element to a (possibly negative, taken mod 255) power.
pub fn pow(a: u8, n: i32) -> u8 {
    if a == 0 {
        return if n == 0 { 1 } else { 0 };
    }
    let t = tables();
    let e = (i32::from(t.log[a as usize]) * n).rem_euclid(255) as usize;
    t.exp[e]
}

fn exp(e: i32) -> u8 {
    tables().exp[e.rem_euclid(255) as usize]
}

fn log(x: u8) -> u8 {
    debug_assert!(x != 0, "log(0) is undefined");
    tables().log[x as usize]
}

/// Builds the monic generator polynomial of the given degree (= number of
/// EC codewords per block), as the product (x - 2^0)(x - 2^1)...(x -
/// 2^(degree-1)) over GF(256). Coefficients are stored highest-to-lowest
/// power, excluding the leading (always 1) term — same layout the standard's
/// worked examples use.
pub fn generator_polynomial(degree: usize) -> Vec<u8> {
    assert!((1..=255).contains(&degree), "degree out of range");
    let mut coeffs = vec![0u8; degree];
    coeffs[degree - 1] = 1;
    let mut root: u8 = 1;
    for _ in 0..degree {
        for j in 0..degree {
            coeffs[j] = mul(coeffs[j], root);
            if j + 1 < degree {
                coeffs[j] ^= coeffs[j + 1];
            }
        }
        root = mul(root, 0x02);
    }
    coeffs
}

/// Systematic polynomial division: appends `ec_len` error-correction bytes
/// after the `data` bytes already placed at the front of `buf`.
/// `buf.len()` must equal `data_len + ec_len`.
pub fn compute_remainder(data: &[u8], generator: &[u8]) -> Vec<u8> {
    let ec_len = generator.len();
    let mut buf = vec![0u8; data.len() + ec_len];
    buf[..data.len()].copy_from_slice(data);
    for i in 0..data.len() {
        let lead = buf[i];
        if lead == 0 {
            continue;
        }
        let k = i32::from(log(lead));
        for j in 0..ec_len {
            // generator[0] is the coefficient of x^(ec_len-1); the leading
            // 1 (x^ec_len) is implicit, matching generator_polynomial's layout.
            let g = generator[j];
            if g == 0 {
                continue;
            }
            buf[i + 1 + j] ^= exp(i32::from(log(g)) + k);
        }
    }
    buf[data.len()..].to_vec()
}

/// Computes the 2t syndrome values S_i = R(alpha^i) for i in 0..ec_len, for a
/// received codeword block (data + EC bytes, in transmission order, i.e.
/// highest-degree coefficient first) — matching the generator polynomial's
/// roots alpha^0 .. alpha^(ec_len-1).
fn syndromes(received: &[u8], ec_len: usize) -> Vec<u8> {
    (0..ec_len)
        .map(|i| {
            let alpha = exp(i as i32);
            let mut acc = 0u8;
            for &b in received {
                acc = mul(acc, alpha) ^ b;
            }
            acc
        })
        .collect()
}

// Berlekamp–Massey: finds the error locator polynomial (coefficients
// lowest-degree first, sigma[0] == 1) from the syndrome sequence. This is
// the textbook LFSR-synthesis formulation; it doesn't depend on whether the
// syndromes start at alpha^0 or alpha^1, only on the 2t-long sequence itself.
fn berlekamp_massey(syn: &[u8]) -> Vec<u8> {
    let mut c = vec![1u8]; // current error locator candidate
    let mut b = vec![1u8]; // error locator candidate from the last length change
    let mut l = 0usize; // current LFSR length
    let mut m = 1usize; // steps since b was last updated
    let mut b_coef = 1u8; // discrepancy at the time b was recorded

    for i in 0..syn.len() {
        let mut delta = syn[i];
        for j in 1..=l {
            if j < c.len() {
                delta ^= mul(c[j], syn[i - j]);
            }
        }
        if delta == 0 {
            m += 1;
        } else if 2 * l <= i {
            let t = c.clone();
            let scale = div(delta, b_coef);
            let needed = b.len() + m;
            if c.len() < needed {
                c.resize(needed, 0);
            }
            for (j, &bj) in b.iter().enumerate() {
                c[j + m] ^= mul(scale, bj);
            }
            l = i + 1 - l;
            b = t;
            b_coef = delta;
            m = 1;
        } else {
            let scale = div(delta, b_coef);
            let needed = b.len() + m;
            if c.len() < needed {
                c.resize(needed, 0);
            }
            for (j, &bj) in b.iter().enumerate() {
                c[j + m] ^= mul(scale, bj);
            }
            m += 1;
        }
    }
    // The algorithm's invariant (deg C <= L) can leave high-order zero
    // coefficients in place; trim them so sigma.len()-1 is the true error
    // count rather than an overcount.
    while c.len() > 1 && *c.last().unwrap() == 0 {
        c.pop();
    }
    c
}

// Chien search: evaluates sigma at every inverse field element to find
// error-locator roots, returning the 0-based positions (from the start of
// `received`) where errors occurred. `received[i]` is the coefficient of
// x^(n-1-i), so its location value is X = alpha^(n-1-i); a root of sigma at
// x = X^-1 = alpha^-(n-1-i) means position i is in error.
fn chien_search(sigma: &[u8], n: usize) -> Option<Vec<usize>> {
    let num_errors = sigma.len() - 1;
    if num_errors == 0 {
        return Some(vec![]);
    }
    let mut positions = Vec::with_capacity(num_errors);
    for i in 0..n {
        let w = (n - 1 - i) as i32;
        let beta = exp(-w);
        let mut acc = 0u8;
        for (j, &coeff) in sigma.iter().enumerate() {
            if coeff == 0 {
                continue;
            }
            acc ^= mul(coeff, pow(beta, j as i32));
        }
        if acc == 0 {
            positions.push(i);
        }
    }
    if positions.len() != num_errors {
        return None;
    }
    Some(positions)
}

// Forney's algorithm: computes the error magnitude at each located position.
fn forney(
    sigma: &[u8],
    syn: &[u8],
    positions: &[usize],
    n: usize,
) -> Vec<u8> {
    // omega(x) = [syndrome(x) * sigma(x)] mod x^(ec_len), syndrome(x) built
    // lowest-degree-first to match sigma's layout.
    let mut omega = vec![0u8; syn.len()];
    for i in 0..syn.len() {
        let mut acc = 0u8;
        for j in 0..=i.min(sigma.len() - 1) {
            acc ^= mul(sigma[j], syn[i - j]);
        }
        omega[i] = acc;
    }

    positions
        .iter()
        .map(|&pos| {
            let w = (n - 1 - pos) as i32;
            let xi = exp(w); // location value X_k
            let xi_inv = exp(-w); // root of sigma, X_k^-1

            let mut omega_val = 0u8;
            for (i, &c) in omega.iter().enumerate() {
                if c == 0 {
                    continue;
                }
                omega_val ^= mul(c, pow(xi_inv, i as i32));
            }

            // sigma'(x) (formal derivative): keep only odd-degree terms, halved degree.
            let mut sigma_prime_val = 0u8;
            for (i, &c) in sigma.iter().enumerate().skip(1).step_by(2) {
                if c == 0 {
                    continue;
                }
                sigma_prime_val ^= mul(c, pow(xi_inv, (i - 1) as i32));
            }

            if sigma_prime_val == 0 {
                0
            } else {
                mul(div(omega_val, sigma_prime_val), xi)
            }
        })
        .collect()
}

/// Corrects a full data+EC codeword block in place. Returns the number of
/// bytes corrected on success, or `None` if the block is uncorrectable.
pub fn correct(block: &mut [u8], ec_len: usize) -> Option<usize> {
    let syn = syndromes(block, ec_len);
    if syn.iter().all(|&s| s == 0) {
        return Some(0);
    }

    let sigma = berlekamp_massey(&syn);
    let num_errors = sigma.len() - 1;
    if num_errors == 0 || num_errors > ec_len / 2 {
        return None;
    }

    let positions = chien_search(&sigma, block.len())?;
    let values = forney(&sigma, &syn, &positions, block.len());

    for (&pos, &val) in positions.iter().zip(values.iter()) {
        block[pos] ^= val;
    }

    let recheck = syndromes(block, ec_len);
    if recheck.iter().any(|&s| s != 0) {
        return None;
    }
    Some(positions.len())
}
