use num_bigint::BigUint;
use ore::{
    backend::Encoding,
    encrypt, evaluate,
    field::FpMatrix,
    io::{from_bytes, read_artifact, to_bytes, write_artifact},
    selftest::Scenario,
    setup, Ciphertext, ErrorKind, PublicParams, SecretKey, Seed, SetupConfig,
};
use ore_core::{
    ClearMatrixSet, Comparison, Family, MatrixBranchingProgram, OreError, OreParams, OreProgram,
};
use pretty_assertions::assert_eq;
use rstest::*;
use serde::{Deserialize, Serialize};

fn program(base: usize, digit_len: usize, family: Family) -> OreProgram {
    OreProgram::new(OreParams::new(base, digit_len, family).unwrap())
}

fn seed(byte: u8) -> Seed {
    Seed::new([byte; 16])
}

#[test]
fn test_suite() {
    for scenario in Scenario::suite() {
        let report = scenario.run(&Seed::default()).unwrap();
        assert!(report.passed(), "{scenario}");
        assert_eq!(report.comparisons, scenario.count * scenario.count);
    }
}

#[rstest]
#[case::normal(Family::Normal)]
#[case::degree_compressed(Family::DegreeCompressed)]
#[case::matrix_compressed(Family::MatrixCompressed)]
fn test_reproducible(#[case] family: Family) {
    let program = program(3, 3, family);
    let message = BigUint::from(17u32);

    let run = || {
        let seed = seed(7);
        let (pp, sk) = setup(&program, &SetupConfig::default(), &seed).unwrap();
        let ct = encrypt(&program, &pp, &sk, &message, &mut seed.message_rng(1)).unwrap();
        (
            to_bytes(&pp).unwrap(),
            to_bytes(&sk).unwrap(),
            to_bytes(&ct).unwrap(),
        )
    };

    assert_eq!(run(), run());
}

#[test]
fn test_seed_changes_key() {
    let program = program(3, 2, Family::MatrixCompressed);
    let (_, sk_a) = setup(&program, &SetupConfig::default(), &seed(1)).unwrap();
    let (_, sk_b) = setup(&program, &SetupConfig::default(), &seed(2)).unwrap();

    assert_ne!(sk_a, sk_b);
}

#[test]
fn test_message_reduced_modulo_space() {
    let program = program(4, 3, Family::DegreeCompressed);
    let seed = Seed::default();
    let (pp, sk) = setup(&program, &SetupConfig::default(), &seed).unwrap();

    let a = encrypt(&program, &pp, &sk, &BigUint::from(12u32), &mut seed.message_rng(1)).unwrap();
    let b = encrypt(&program, &pp, &sk, &BigUint::from(76u32), &mut seed.message_rng(2)).unwrap();

    assert_eq!(evaluate(&program, &pp, &a, &b).unwrap(), Comparison::Equal);
}

#[test]
fn test_file_artifacts() {
    let program = program(5, 2, Family::MatrixCompressed);
    let seed = Seed::default();
    let (pp, sk) = setup(&program, &SetupConfig::default(), &seed).unwrap();

    let dir = std::env::temp_dir().join(format!("ore-engine-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    write_artifact(dir.join("pp.bin"), &pp).unwrap();
    write_artifact(dir.join("sk.bin"), &sk).unwrap();

    let pp_read: PublicParams = read_artifact(dir.join("pp.bin")).unwrap();
    let sk_read: SecretKey = read_artifact(dir.join("sk.bin")).unwrap();
    assert_eq!(pp_read, pp);
    assert_eq!(sk_read, sk);

    for (i, message) in [3u32, 21].into_iter().enumerate() {
        let ct = encrypt(
            &program,
            &pp_read,
            &sk_read,
            &BigUint::from(message),
            &mut seed.message_rng(i + 1),
        )
        .unwrap();
        write_artifact(dir.join(format!("ct{}.bin", i + 1)), &ct).unwrap();
    }

    let first: Ciphertext = read_artifact(dir.join("ct1.bin")).unwrap();
    let second: Ciphertext = read_artifact(dir.join("ct2.bin")).unwrap();

    assert_eq!(evaluate(&program, &pp, &first, &second).unwrap(), Comparison::Less);
    assert_eq!(evaluate(&program, &pp, &second, &first).unwrap(), Comparison::Greater);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_artifact() {
    let path = std::env::temp_dir().join("ore-engine-test-missing.bin");
    let err = read_artifact::<PublicParams>(path).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
}

// Declares Kilian dimensions one larger than the compiled matrices.
struct WrongJunctions(OreProgram);

impl MatrixBranchingProgram for WrongJunctions {
    fn params(&self) -> &OreParams {
        self.0.params()
    }

    fn kilian_dims(&self) -> Vec<usize> {
        self.0.kilian_dims().into_iter().map(|dim| dim + 1).collect()
    }

    fn set_matrices(&self, message: &BigUint) -> Result<ClearMatrixSet, OreError> {
        self.0.set_matrices(message)
    }
}

// Claims a third input.
struct ThreeInputs(OreProgram);

impl MatrixBranchingProgram for ThreeInputs {
    fn params(&self) -> &OreParams {
        self.0.params()
    }

    fn num_inputs(&self) -> usize {
        3
    }

    fn set_matrices(&self, message: &BigUint) -> Result<ClearMatrixSet, OreError> {
        self.0.set_matrices(message)
    }
}

#[test]
fn test_setup_rejects_wrong_junctions() {
    let program = WrongJunctions(program(3, 4, Family::MatrixCompressed));
    let err = setup(&program, &SetupConfig::default(), &Seed::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Structure);
}

#[test]
fn test_setup_rejects_three_inputs() {
    let program = ThreeInputs(program(3, 2, Family::Normal));
    let err = setup(&program, &SetupConfig::default(), &Seed::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_foreign_ciphertext() {
    let seed = Seed::default();
    let small = program(3, 2, Family::MatrixCompressed);
    let large = program(3, 3, Family::MatrixCompressed);

    let (pp_small, sk_small) = setup(&small, &SetupConfig::default(), &seed).unwrap();
    let (pp_large, sk_large) = setup(&large, &SetupConfig::default(), &seed).unwrap();

    let message = BigUint::from(4u32);
    let a = encrypt(&small, &pp_small, &sk_small, &message, &mut seed.message_rng(1)).unwrap();
    let b = encrypt(&large, &pp_large, &sk_large, &message, &mut seed.message_rng(2)).unwrap();

    let err = evaluate(&small, &pp_small, &a, &b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mismatch);

    let err = encrypt(&small, &pp_large, &sk_large, &message, &mut seed.message_rng(3)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mismatch);
}

// Field-for-field mirrors of the artifact encodings, used to corrupt them.
#[derive(Serialize, Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<Encoding>,
}

#[derive(Serialize, Deserialize)]
struct RawCiphertext {
    params: OreParams,
    x: Vec<RawMatrix>,
    y: Vec<RawMatrix>,
}

#[derive(Serialize, Deserialize)]
struct RawSecretKey {
    randomizers: Vec<FpMatrix>,
    inverses: Vec<FpMatrix>,
}

fn corrupt_ciphertext(ct: &Ciphertext, f: impl FnOnce(&mut RawCiphertext)) -> Vec<u8> {
    let mut raw: RawCiphertext = from_bytes(&to_bytes(ct).unwrap()).unwrap();
    f(&mut raw);
    to_bytes(&raw).unwrap()
}

#[test]
fn test_corrupted_ciphertext() {
    let program = program(3, 3, Family::MatrixCompressed);
    let seed = Seed::default();
    let (pp, sk) = setup(&program, &SetupConfig::default(), &seed).unwrap();

    let a = encrypt(&program, &pp, &sk, &BigUint::from(7u32), &mut seed.message_rng(1)).unwrap();
    let b = encrypt(&program, &pp, &sk, &BigUint::from(19u32), &mut seed.message_rng(2)).unwrap();

    // Untouched bytes decode to the same ciphertext.
    let same: Ciphertext = from_bytes(&corrupt_ciphertext(&b, |_| {})).unwrap();
    assert_eq!(same, b);

    let truncated = corrupt_ciphertext(&b, |raw| {
        raw.y[1].entries.pop();
    });
    let err = from_bytes::<Ciphertext>(&truncated).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);

    let transposed = corrupt_ciphertext(&b, |raw| {
        let m = &mut raw.y[1];
        std::mem::swap(&mut m.rows, &mut m.cols);
    });
    let transposed: Ciphertext = from_bytes(&transposed).unwrap();
    let err = evaluate(&program, &pp, &a, &transposed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mismatch);

    let dropped = corrupt_ciphertext(&b, |raw| {
        raw.x.pop();
    });
    let dropped: Ciphertext = from_bytes(&dropped).unwrap();
    let err = evaluate(&program, &pp, &dropped, &a).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mismatch);
}

#[test]
fn test_corrupted_secret_key() {
    let program = program(3, 2, Family::MatrixCompressed);
    let seed = Seed::default();
    let (pp, sk) = setup(&program, &SetupConfig::default(), &seed).unwrap();

    let mut raw: RawSecretKey = from_bytes(&to_bytes(&sk).unwrap()).unwrap();
    raw.inverses.pop();
    let short: SecretKey = from_bytes(&to_bytes(&raw).unwrap()).unwrap();

    let err = encrypt(&program, &pp, &short, &BigUint::from(5u32), &mut seed.message_rng(1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mismatch);
}
