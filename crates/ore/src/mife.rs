//! Multi-input functional encryption of matrix branching programs.
//!
//! Setup samples one invertible Kilian randomizer per junction between consecutive levels.
//! Encryption compiles a plaintext into both streams of matrices, randomizes every matrix
//! `M_l` into `a · R_{l-1}^{-1} · M_l · R_l` with a fresh nonzero scalar `a`, and encodes each
//! entry at its level. Evaluation multiplies the `X` matrices of the first ciphertext with the
//! `Y` matrices of the second one in level order, which cancels the randomizers, and zero-tests
//! the comparison columns of the first row.

use derive_builder::Builder;
use num_bigint::BigUint;
use ore_core::{check_structure, Comparison, MatrixBranchingProgram, OreParams, Stream};
use rand::Rng;
use rand_core::CryptoRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::{
    backend::{BackendKind, Encoding, MultilinearMap},
    field::{Fp, FpMatrix, MatrixParts, MODULUS},
    seed::{Seed, SETUP_LABEL},
    BackendError, MifeError,
};

/// Default security parameter.
pub const DEFAULT_LAMBDA: usize = 80;

/// Setup configuration.
#[derive(Debug, Clone, Builder)]
pub struct SetupConfig {
    /// Security parameter.
    #[builder(default = "DEFAULT_LAMBDA")]
    lambda: usize,
    /// Multilinear-map backend.
    #[builder(default)]
    backend: BackendKind,
}

impl SetupConfig {
    /// Creates a new builder for the setup configuration.
    pub fn builder() -> SetupConfigBuilder {
        SetupConfigBuilder::default()
    }

    /// Returns the security parameter.
    pub fn lambda(&self) -> usize {
        self.lambda
    }

    /// Returns the backend.
    pub fn backend(&self) -> BackendKind {
        self.backend
    }
}

impl Default for SetupConfig {
    fn default() -> Self {
        SetupConfigBuilder::default().build().unwrap()
    }
}

/// Public parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicParams {
    params: OreParams,
    kappa: usize,
    backend: BackendKind,
    lambda: usize,
    modulus: u64,
    encoding_count: usize,
    kilian_dims: Vec<usize>,
}

impl PublicParams {
    /// Returns the program parameters.
    pub fn params(&self) -> &OreParams {
        &self.params
    }

    /// Returns the multiplicative depth.
    pub fn kappa(&self) -> usize {
        self.kappa
    }

    /// Returns the backend kind.
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Returns the security parameter.
    pub fn lambda(&self) -> usize {
        self.lambda
    }

    /// Returns the modulus of the plaintext ring of the encodings.
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Returns the number of encodings in one ciphertext.
    pub fn encoding_count(&self) -> usize {
        self.encoding_count
    }

    /// Returns the Kilian dimensions.
    pub fn kilian_dims(&self) -> &[usize] {
        &self.kilian_dims
    }
}

/// The secret key: one Kilian randomizer and its inverse per junction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey {
    randomizers: Vec<FpMatrix>,
    inverses: Vec<FpMatrix>,
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("junctions", &self.randomizers.len())
            .finish_non_exhaustive()
    }
}

/// A matrix of encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MatrixParts<Encoding>", into = "MatrixParts<Encoding>")]
pub struct EncodedMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<Encoding>,
}

impl EncodedMatrix {
    /// Returns `(rows, cols)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn row(&self, row: usize) -> Option<&[Encoding]> {
        self.entries.get(row * self.cols..(row + 1) * self.cols)
    }
}

impl TryFrom<MatrixParts<Encoding>> for EncodedMatrix {
    type Error = BackendError;

    fn try_from(parts: MatrixParts<Encoding>) -> Result<Self, Self::Error> {
        parts.check()?;
        Ok(Self {
            rows: parts.rows,
            cols: parts.cols,
            entries: parts.entries,
        })
    }
}

impl From<EncodedMatrix> for MatrixParts<Encoding> {
    fn from(m: EncodedMatrix) -> Self {
        Self {
            rows: m.rows,
            cols: m.cols,
            entries: m.entries,
        }
    }
}

/// An encrypted plaintext, usable as either input of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    params: OreParams,
    x: Vec<EncodedMatrix>,
    y: Vec<EncodedMatrix>,
}

impl Ciphertext {
    /// Returns the program parameters the ciphertext was produced for.
    pub fn params(&self) -> &OreParams {
        &self.params
    }

    /// Returns the encoded matrices of `stream`.
    pub fn stream(&self, stream: Stream) -> &[EncodedMatrix] {
        match stream {
            Stream::X => &self.x,
            Stream::Y => &self.y,
        }
    }

    /// Returns the number of encodings.
    pub fn encoding_count(&self) -> usize {
        self.x.iter().chain(&self.y).map(|m| m.entries.len()).sum()
    }
}

/// Generates public parameters and a secret key for `program`.
///
/// The program's declared shape is checked against a probe compilation first. Any mismatch
/// aborts before key material is generated.
#[instrument(level = "debug", skip_all, fields(params = %program.params()), err)]
pub fn setup<P>(
    program: &P,
    config: &SetupConfig,
    seed: &Seed,
) -> Result<(PublicParams, SecretKey), MifeError>
where
    P: MatrixBranchingProgram + ?Sized,
{
    let params = *program.params();
    let kappa = program.kappa();

    if program.num_inputs() != Stream::ALL.len() {
        return Err(MifeError::config(format!(
            "expected a two-input program, got {} inputs",
            program.num_inputs()
        )));
    }

    let probe = program.set_matrices(&BigUint::default())?;
    check_structure(program, &probe)?;

    // Fails early on unsupported depths.
    config.backend.instantiate(kappa)?;

    let kilian_dims = program.kilian_dims();
    let mut rng = seed.rng(SETUP_LABEL);
    let (randomizers, inverses): (Vec<_>, Vec<_>) = kilian_dims
        .iter()
        .map(|&dim| FpMatrix::random_invertible(dim, &mut rng))
        .unzip();

    let pp = PublicParams {
        params,
        kappa,
        backend: config.backend,
        lambda: config.lambda,
        modulus: MODULUS,
        encoding_count: probe.encoding_count(),
        kilian_dims,
    };

    info!(
        kappa,
        encodings = pp.encoding_count,
        backend = %pp.backend,
        lambda = pp.lambda,
        "setup complete"
    );

    Ok((
        pp,
        SecretKey {
            randomizers,
            inverses,
        },
    ))
}

/// Encrypts `message`.
///
/// The message is reduced modulo `d^n` before compilation.
#[instrument(level = "debug", skip_all, err)]
pub fn encrypt<P, R>(
    program: &P,
    pp: &PublicParams,
    sk: &SecretKey,
    message: &BigUint,
    rng: &mut R,
) -> Result<Ciphertext, MifeError>
where
    P: MatrixBranchingProgram + ?Sized,
    R: Rng + CryptoRng,
{
    check_public_params(program, pp)?;
    check_secret_key(pp, sk)?;

    let mmap = pp.backend.instantiate(pp.kappa)?;
    let set = program.set_matrices(message)?;

    let mut progress = Progress::new(pp.encoding_count);
    let mut x = Vec::with_capacity(set.x.len());
    let mut y = Vec::with_capacity(set.y.len());

    for level in 0..pp.kappa {
        let (stream, position) = program.ordering(level);
        let matrix = set.get(stream, position).ok_or_else(|| {
            MifeError::mismatch(format!(
                "level {level} maps to missing matrix {position} of stream {stream}"
            ))
        })?;

        let scalar = loop {
            let scalar: Fp = rng.gen();
            if !scalar.is_zero() {
                break scalar;
            }
        };

        let mut randomized = FpMatrix::from(matrix).scale(scalar);
        if level > 0 {
            randomized = sk.inverses[level - 1].mul(&randomized)?;
        }
        if level + 1 < pp.kappa {
            randomized = randomized.mul(&sk.randomizers[level])?;
        }

        let encoded = encode_matrix(mmap.as_ref(), &randomized, level, &mut progress)?;
        match stream {
            Stream::X => x.push(encoded),
            Stream::Y => y.push(encoded),
        }
    }

    debug!(encodings = progress.done, "encryption complete");

    Ok(Ciphertext {
        params: pp.params,
        x,
        y,
    })
}

/// Compares the plaintexts of `first` and `second`.
#[instrument(level = "debug", skip_all, err)]
pub fn evaluate<P>(
    program: &P,
    pp: &PublicParams,
    first: &Ciphertext,
    second: &Ciphertext,
) -> Result<Comparison, MifeError>
where
    P: MatrixBranchingProgram + ?Sized,
{
    for ct in [first, second] {
        check_ciphertext(program, pp, ct)?;
    }

    let mmap = pp.backend.instantiate(pp.kappa)?;

    let mut row: Option<Vec<Encoding>> = None;
    for level in 0..pp.kappa {
        let (stream, position) = program.ordering(level);
        let ct = match stream {
            Stream::X => first,
            Stream::Y => second,
        };
        let matrix = ct.stream(stream).get(position).ok_or_else(|| {
            MifeError::mismatch(format!(
                "level {level} maps to missing matrix {position} of stream {stream}"
            ))
        })?;

        row = Some(match row {
            None => matrix
                .row(0)
                .ok_or_else(|| MifeError::mismatch("first matrix has no rows"))?
                .to_vec(),
            Some(row) => vec_mul(mmap.as_ref(), &row, matrix)?,
        });
    }

    let row = row.ok_or_else(|| MifeError::mismatch("program has no levels"))?;
    if row.len() < 3 {
        return Err(MifeError::mismatch(format!(
            "final row has {} columns, expected at least 3",
            row.len()
        )));
    }

    let mut pattern = [false; 3];
    for (slot, encoding) in pattern.iter_mut().zip(&row) {
        *slot = !mmap.is_zero(encoding)?;
    }
    trace!(?pattern, "zero test");

    Ok(program.parse(pattern).map_err(ore_core::OreError::from)?)
}

fn check_public_params<P>(program: &P, pp: &PublicParams) -> Result<(), MifeError>
where
    P: MatrixBranchingProgram + ?Sized,
{
    if program.params() != &pp.params {
        return Err(MifeError::mismatch(format!(
            "program parameters ({}) differ from public parameters ({})",
            program.params(),
            pp.params
        )));
    }
    if program.kappa() != pp.kappa || program.kilian_dims() != pp.kilian_dims {
        return Err(MifeError::mismatch(format!(
            "public parameters declare depth {} with junctions {:?}, program has depth {} \
             with junctions {:?}",
            pp.kappa,
            pp.kilian_dims,
            program.kappa(),
            program.kilian_dims()
        )));
    }

    Ok(())
}

fn check_secret_key(pp: &PublicParams, sk: &SecretKey) -> Result<(), MifeError> {
    let expected = pp.kilian_dims.len();
    if sk.randomizers.len() != expected || sk.inverses.len() != expected {
        return Err(MifeError::mismatch(format!(
            "secret key holds {} randomizers and {} inverses, expected {expected} of each",
            sk.randomizers.len(),
            sk.inverses.len()
        )));
    }

    for (junction, (&dim, (r, r_inv))) in pp
        .kilian_dims
        .iter()
        .zip(sk.randomizers.iter().zip(&sk.inverses))
        .enumerate()
    {
        for m in [r, r_inv] {
            if m.dims() != (dim, dim) || m.entries().len() != dim * dim {
                return Err(MifeError::mismatch(format!(
                    "secret key matrix {:?} at junction {junction}, expected ({dim}, {dim})",
                    m.dims()
                )));
            }
        }
    }

    Ok(())
}

// Checks that the matrices of `ct` chain through the Kilian junctions of `pp`.
fn check_ciphertext<P>(program: &P, pp: &PublicParams, ct: &Ciphertext) -> Result<(), MifeError>
where
    P: MatrixBranchingProgram + ?Sized,
{
    if ct.params != pp.params {
        return Err(MifeError::mismatch(format!(
            "ciphertext parameters ({}) differ from public parameters ({})",
            ct.params, pp.params
        )));
    }
    check_public_params(program, pp)?;

    for stream in Stream::ALL {
        let expected = program.stream_len(stream);
        let actual = ct.stream(stream).len();
        if expected != actual {
            return Err(MifeError::mismatch(format!(
                "ciphertext stream {stream} has {actual} matrices, expected {expected}"
            )));
        }
    }

    for level in 0..pp.kappa {
        let (stream, position) = program.ordering(level);
        let matrix = ct.stream(stream).get(position).ok_or_else(|| {
            MifeError::mismatch(format!(
                "level {level} maps to missing matrix {position} of stream {stream}"
            ))
        })?;
        let (rows, cols) = matrix.dims();

        if rows.checked_mul(cols) != Some(matrix.entries.len()) {
            return Err(MifeError::mismatch(format!(
                "matrix at level {level} is {rows}x{cols} but holds {} entries",
                matrix.entries.len()
            )));
        }

        let rows_ok = match level.checked_sub(1) {
            Some(junction) => pp.kilian_dims.get(junction) == Some(&rows),
            None => rows > 0,
        };
        let cols_ok = match pp.kilian_dims.get(level) {
            Some(&dim) => cols == dim,
            None => cols >= 3,
        };
        if !rows_ok || !cols_ok {
            return Err(MifeError::mismatch(format!(
                "matrix at level {level} is {rows}x{cols}, which does not chain with the \
                 junctions {:?}",
                pp.kilian_dims
            )));
        }
    }

    Ok(())
}

fn encode_matrix(
    mmap: &dyn MultilinearMap,
    matrix: &FpMatrix,
    level: usize,
    progress: &mut Progress,
) -> Result<EncodedMatrix, MifeError> {
    let (rows, cols) = matrix.dims();
    let entries = matrix
        .entries()
        .iter()
        .map(|&value| {
            progress.tick();
            mmap.encode(value, level)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EncodedMatrix {
        rows,
        cols,
        entries,
    })
}

// Multiplies the row vector `row` by `matrix`.
fn vec_mul(
    mmap: &dyn MultilinearMap,
    row: &[Encoding],
    matrix: &EncodedMatrix,
) -> Result<Vec<Encoding>, MifeError> {
    if row.len() != matrix.rows {
        return Err(MifeError::mismatch(format!(
            "cannot multiply a row of {} entries by a {:?} matrix",
            row.len(),
            matrix.dims()
        )));
    }

    (0..matrix.cols)
        .map(|col| {
            let mut acc: Option<Encoding> = None;
            for (k, lhs) in row.iter().enumerate() {
                let term = mmap.mul(lhs, &matrix.entries[k * matrix.cols + col])?;
                acc = Some(match acc {
                    None => term,
                    Some(acc) => mmap.add(&acc, &term)?,
                });
            }
            acc.ok_or_else(|| MifeError::mismatch("cannot multiply an empty row"))
        })
        .collect()
}

// Logs every time another tenth of the expected encodings is produced.
struct Progress {
    expected: usize,
    step: usize,
    done: usize,
}

impl Progress {
    fn new(expected: usize) -> Self {
        Self {
            expected,
            step: (expected / 10).max(1),
            done: 0,
        }
    }

    fn tick(&mut self) {
        self.done += 1;
        if self.done % self.step == 0 {
            debug!(done = self.done, expected = self.expected, "encoding");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ore_core::{Family, OreProgram};
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn program(base: usize, digit_len: usize, family: Family) -> OreProgram {
        OreProgram::new(OreParams::new(base, digit_len, family).unwrap())
    }

    #[test]
    fn test_compare() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);

        for family in Family::ALL {
            let program = program(3, 2, family);
            let (pp, sk) = setup(&program, &SetupConfig::default(), &Seed::default()).unwrap();

            let cts: Vec<_> = (0..9u32)
                .map(|m| encrypt(&program, &pp, &sk, &BigUint::from(m), &mut rng).unwrap())
                .collect();

            for (x, ct_x) in cts.iter().enumerate() {
                for (y, ct_y) in cts.iter().enumerate() {
                    assert_eq!(
                        evaluate(&program, &pp, ct_x, ct_y).unwrap(),
                        Comparison::of(&x, &y),
                        "{family}: x = {x}, y = {y}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_ciphertext_shape() {
        let program = program(4, 3, Family::MatrixCompressed);
        let (pp, sk) = setup(&program, &SetupConfig::default(), &Seed::default()).unwrap();
        let ct = encrypt(
            &program,
            &pp,
            &sk,
            &BigUint::from(17u32),
            &mut ChaCha12Rng::seed_from_u64(1),
        )
        .unwrap();

        assert_eq!(ct.encoding_count(), pp.encoding_count());
        assert_eq!(pp.kilian_dims(), &[4, 3, 6, 3, 6]);
        assert_eq!(ct.stream(Stream::X)[1].dims(), (3, 6));
    }

    #[test]
    fn test_mismatched_parameters() {
        let a = program(2, 2, Family::DegreeCompressed);
        let b = program(2, 3, Family::DegreeCompressed);
        let mut rng = ChaCha12Rng::seed_from_u64(0);

        let (pp_a, sk_a) = setup(&a, &SetupConfig::default(), &Seed::default()).unwrap();
        let (pp_b, sk_b) = setup(&b, &SetupConfig::default(), &Seed::default()).unwrap();

        let err = encrypt(&b, &pp_a, &sk_a, &BigUint::from(1u32), &mut rng).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Mismatch);

        let ct_a = encrypt(&a, &pp_a, &sk_a, &BigUint::from(1u32), &mut rng).unwrap();
        let ct_b = encrypt(&b, &pp_b, &sk_b, &BigUint::from(1u32), &mut rng).unwrap();
        let err = evaluate(&a, &pp_a, &ct_a, &ct_b).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Mismatch);
    }

    #[test]
    fn test_malformed_ciphertext() {
        let program = program(3, 3, Family::MatrixCompressed);
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let (pp, sk) = setup(&program, &SetupConfig::default(), &Seed::default()).unwrap();

        let a = encrypt(&program, &pp, &sk, &BigUint::from(7u32), &mut rng).unwrap();
        let b = encrypt(&program, &pp, &sk, &BigUint::from(11u32), &mut rng).unwrap();

        let mut truncated = b.clone();
        truncated.y[1].entries.pop();
        let err = evaluate(&program, &pp, &a, &truncated).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Mismatch);

        let mut transposed = b.clone();
        let m = &mut transposed.y[1];
        std::mem::swap(&mut m.rows, &mut m.cols);
        let err = evaluate(&program, &pp, &a, &transposed).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Mismatch);

        let mut empty = a.clone();
        empty.x[0] = EncodedMatrix {
            rows: 0,
            cols: 0,
            entries: Vec::new(),
        };
        let err = evaluate(&program, &pp, &empty, &b).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Mismatch);

        assert_eq!(evaluate(&program, &pp, &a, &b).unwrap(), Comparison::Less);
    }

    #[test]
    fn test_malformed_secret_key() {
        let program = program(3, 2, Family::DegreeCompressed);
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let (pp, sk) = setup(&program, &SetupConfig::default(), &Seed::default()).unwrap();
        let message = BigUint::from(4u32);

        let mut missing = sk.clone();
        missing.inverses.pop();
        let err = encrypt(&program, &pp, &missing, &message, &mut rng).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Mismatch);

        let mut resized = sk.clone();
        resized.randomizers[0] = FpMatrix::identity(pp.kilian_dims()[0] + 1);
        let err = encrypt(&program, &pp, &resized, &message, &mut rng).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Mismatch);

        let mut deep = pp.clone();
        deep.kappa += 1;
        let err = encrypt(&program, &deep, &sk, &message, &mut rng).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Mismatch);
    }
}
