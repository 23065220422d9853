use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use num_bigint::BigUint;
use ore::{
    encrypt, evaluate, generate_plaintexts,
    io::{read_artifact, write_artifact},
    selftest::Scenario,
    setup, Ciphertext, PublicParams, SecretKey, Seed, SetupConfig, DEFAULT_LAMBDA,
};
use ore_core::{
    optimize, optimize_family, EncodingCostTable, Family, MessageSpace, OptimizerConfig,
    OreProgram, DEFAULT_MAX_BASE,
};
use tracing::Level;

/// Order-revealing encryption over multi-input functional encryption.
#[derive(Debug, Parser)]
#[clap(name = "ore", version)]
struct Cli {
    /// Increase logging verbosity, repeat for more.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

/// The message space `[0, base^exp)`.
#[derive(Debug, clap::Args)]
struct SpaceArgs {
    /// Base of the message space size.
    #[clap(long, default_value_t = 2)]
    base: usize,
    /// Exponent of the message space size.
    #[clap(long)]
    exp: u32,
}

impl SpaceArgs {
    fn space(&self) -> Result<MessageSpace> {
        Ok(MessageSpace::from_power(self.base, self.exp)?)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the parameters chosen for a message space.
    Params {
        #[clap(flatten)]
        space: SpaceArgs,
        /// Largest base searched.
        #[clap(long, default_value_t = DEFAULT_MAX_BASE)]
        max_base: usize,
        /// YAML cost table mapping kappa to the cost of one encoding.
        #[clap(long)]
        cost_table: Option<PathBuf>,
        /// Search only this family.
        #[clap(long)]
        family: Option<Family>,
    },
    /// Print random plaintexts, one per line.
    Plaintexts {
        #[clap(flatten)]
        space: SpaceArgs,
        /// Number of plaintexts.
        #[clap(long)]
        count: usize,
        /// Seed as 32 hex characters.
        #[clap(long)]
        seed: Option<Seed>,
    },
    /// Generate public parameters and a secret key.
    Setup {
        #[clap(flatten)]
        space: SpaceArgs,
        /// Security parameter.
        #[clap(long, default_value_t = DEFAULT_LAMBDA)]
        lambda: usize,
        /// Seed as 32 hex characters.
        #[clap(long)]
        seed: Option<Seed>,
        /// Program family, chosen by the optimizer if omitted.
        #[clap(long)]
        family: Option<Family>,
        /// Output path of the public parameters.
        #[clap(long)]
        pp: PathBuf,
        /// Output path of the secret key.
        #[clap(long)]
        sk: PathBuf,
    },
    /// Encrypt plaintexts read from a file, one per line.
    Encrypt {
        /// Public parameters.
        #[clap(long)]
        pp: PathBuf,
        /// Secret key.
        #[clap(long)]
        sk: PathBuf,
        /// File of plaintexts.
        #[clap(long)]
        messages: PathBuf,
        /// Encrypt only the plaintext on this line, counting from one.
        #[clap(long)]
        index: Option<usize>,
        /// Seed as 32 hex characters.
        #[clap(long)]
        seed: Option<Seed>,
        /// Directory receiving `ct{i}.bin`.
        #[clap(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Compare two ciphertexts, printing 0 (equal), 1 (less) or 2 (greater).
    Evaluate {
        /// Public parameters.
        #[clap(long)]
        pp: PathBuf,
        /// First ciphertext.
        first: PathBuf,
        /// Second ciphertext.
        second: PathBuf,
    },
    /// Run the end-to-end scenarios.
    SelfTest {
        /// Seed as 32 hex characters.
        #[clap(long)]
        seed: Option<Seed>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Params {
            space,
            max_base,
            cost_table,
            family,
        } => {
            let mut builder = OptimizerConfig::builder();
            builder.max_base(max_base);
            if let Some(path) = cost_table {
                let yaml = fs::read_to_string(&path)
                    .with_context(|| format!("reading cost table {}", path.display()))?;
                builder.cost_table(EncodingCostTable::from_yaml(&yaml)?);
            }
            let config = builder.build()?;

            let space = space.space()?;
            let selection = match family {
                Some(family) => optimize_family(&space, &config, family)?,
                None => optimize(&space, &config)?,
            };

            println!("{}", selection.params);
            println!("encodings per ciphertext: {}", selection.encoding_count);
            println!("predicted cost: {}", selection.total_cost);
        }
        Command::Plaintexts { space, count, seed } => {
            let space = space.space()?;
            for message in generate_plaintexts(count, space.size(), &seed.unwrap_or_default()) {
                println!("{message}");
            }
        }
        Command::Setup {
            space,
            lambda,
            seed,
            family,
            pp,
            sk,
        } => {
            let space = space.space()?;
            let config = OptimizerConfig::default();
            let selection = match family {
                Some(family) => optimize_family(&space, &config, family)?,
                None => optimize(&space, &config)?,
            };

            let program = OreProgram::new(selection.params);
            let setup_config = SetupConfig::builder().lambda(lambda).build()?;
            let (public, secret) = setup(&program, &setup_config, &seed.unwrap_or_default())?;

            write_artifact(&pp, &public)?;
            write_artifact(&sk, &secret)?;

            println!("{}", selection.params);
        }
        Command::Encrypt {
            pp,
            sk,
            messages,
            index,
            seed,
            out_dir,
        } => {
            let public: PublicParams = read_artifact(&pp)?;
            let secret: SecretKey = read_artifact(&sk)?;
            let program = OreProgram::new(*public.params());
            let seed = seed.unwrap_or_default();

            let messages = read_messages(&messages)?;
            let selected: Vec<_> = match index {
                Some(index) if index == 0 || index > messages.len() => {
                    bail!("index {index} is out of range [1, {}]", messages.len())
                }
                Some(index) => vec![(index, &messages[index - 1])],
                None => messages.iter().enumerate().map(|(i, m)| (i + 1, m)).collect(),
            };

            fs::create_dir_all(&out_dir)?;
            for (index, message) in selected {
                let ct = encrypt(&program, &public, &secret, message, &mut seed.message_rng(index))?;
                let path = out_dir.join(format!("ct{index}.bin"));
                write_artifact(&path, &ct)?;
                println!("{}", path.display());
            }
        }
        Command::Evaluate { pp, first, second } => {
            let public: PublicParams = read_artifact(&pp)?;
            let first: Ciphertext = read_artifact(&first)?;
            let second: Ciphertext = read_artifact(&second)?;
            let program = OreProgram::new(*public.params());

            let verdict = evaluate(&program, &public, &first, &second)?;
            println!("{} ({verdict})", verdict.index());
        }
        Command::SelfTest { seed } => {
            let seed = seed.unwrap_or_default();
            let mut failed = 0;
            for scenario in Scenario::suite() {
                let report = scenario.run(&seed)?;
                if report.passed() {
                    println!("SUCCESS: {scenario}");
                } else {
                    failed += 1;
                    println!(
                        "FAIL: {scenario} ({} of {} comparisons wrong)",
                        report.mismatches, report.comparisons
                    );
                }
            }
            if failed > 0 {
                bail!("{failed} scenarios failed");
            }
        }
    }

    Ok(())
}

fn read_messages(path: &Path) -> Result<Vec<BigUint>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading messages {}", path.display()))?;

    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<BigUint>()
                .with_context(|| format!("invalid plaintext {line:?}"))
        })
        .collect()
}
