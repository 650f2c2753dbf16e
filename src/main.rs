mod log;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{AppSettings, ArgAction, Args, Parser, Subcommand};
use run::{Computer, Program, State};
use translate::{Options, Source, TranslateError, STACK_BASE};

#[derive(Debug, Clone, Parser)]
#[clap(
    author,
    version,
    about,
    global_setting = AppSettings::DeriveDisplayOrder,
    disable_help_subcommand = true,
)]
struct Opt {
    /// Show more output, can be given twice.
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Translate VM code to Hack assembly.
    Build {
        /// A `.vm` file or a directory of them.
        #[clap()]
        input: PathBuf,

        /// The output file.
        #[clap(long, short)]
        output: Option<PathBuf>,

        /// Don't write each command as a comment.
        #[clap(long)]
        no_annotate: bool,

        #[clap(flatten)]
        program: ProgramOpt,
    },
    /// Translate VM code and execute it.
    Run {
        /// A `.vm` file or a directory of them.
        #[clap()]
        input: PathBuf,

        /// The maximum number of instructions to execute.
        #[clap(long, default_value_t = 1_000_000)]
        steps: usize,

        #[clap(flatten)]
        program: ProgramOpt,
    },
}

#[derive(Debug, Clone, Args)]
struct ProgramOpt {
    /// Don't initialize the stack and call the entry function.
    #[clap(long)]
    no_bootstrap: bool,

    /// The function called on startup.
    #[clap(long, value_name = "NAME", default_value = "Sys.init")]
    entry: String,
}

/// The translation units and where they were read from.
struct Units(Vec<(PathBuf, Source)>);

impl ProgramOpt {
    fn options(self, annotate: bool) -> Options {
        Options {
            bootstrap: !self.no_bootstrap,
            entry: self.entry,
            annotate,
        }
    }
}

fn is_vm(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(OsStr::to_str) == Some("vm")
}

impl Units {
    /// Read a single file, or every `.vm` file in a directory in name order.
    fn read(input: &Path) -> Result<Self> {
        let paths = if input.is_dir() {
            let mut paths = Vec::new();
            for entry in fs::read_dir(input)
                .with_context(|| format!("failed to read directory `{}`", input.display()))?
            {
                let path = entry?.path();
                if is_vm(&path) {
                    paths.push(path);
                }
            }
            if paths.is_empty() {
                bail!("no `.vm` files found in `{}`", input.display());
            }
            paths.sort();
            paths
        } else {
            vec![input.to_owned()]
        };
        let units = paths
            .into_iter()
            .map(|path| Source::from_path(&path).map(|source| (path, source)))
            .collect::<Result<_, _>>()?;
        Ok(Self(units))
    }

    /// Translate all the units, rendering the offending command on error.
    fn translate(&self, options: Options) -> Result<String> {
        for (path, _) in &self.0 {
            log::debug!("reading {}", path.display());
        }
        match translate::to_asm(self.0.iter().map(|(_, source)| source), options) {
            Ok(asm) => Ok(asm),
            Err(TranslateError::Command { unit, error, .. }) => {
                let (path, source) = self
                    .0
                    .iter()
                    .find(|(_, source)| source.name == unit)
                    .context("error in unknown unit")?;
                eprintln!("{}", error.pretty(&source.text, path));
                bail!("could not translate `{}`", path.display());
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// The default output file for the given input.
fn output_path(input: &Path) -> Result<PathBuf> {
    if input.is_dir() {
        let dir = input.canonicalize()?;
        let name = dir
            .file_name()
            .with_context(|| format!("failed to name output for `{}`", input.display()))?;
        Ok(input.join(format!("{}.asm", name.to_string_lossy())))
    } else {
        Ok(input.with_extension("asm"))
    }
}

fn build(input: PathBuf, output: Option<PathBuf>, options: Options) -> Result<()> {
    let output = match output {
        Some(output) => output,
        None => output_path(&input)?,
    };
    let units = Units::read(&input)?;
    log::info!("translating {}", input.display());
    let asm = units.translate(options)?;
    fs::write(&output, asm)
        .with_context(|| format!("failed to write `{}`", output.display()))?;
    log::info!("finished {}", output.display());
    Ok(())
}

fn run(input: PathBuf, steps: usize, options: Options) -> Result<()> {
    let bootstrap = options.bootstrap;
    let asm = Units::read(&input)?.translate(options)?;
    let mut computer = Computer::new(Program::assemble(&asm)?);
    if !bootstrap {
        computer.set_ram(0, STACK_BASE as i16);
    }
    log::info!("running {}", input.display());
    match computer.run(steps)? {
        State::Halted => log::info!("halted after {} steps", computer.steps()),
        State::Exhausted => log::info!("stopped after {} steps", computer.steps()),
    }
    let sp = computer.ram(0);
    println!("SP: {}", sp);
    if sp > 0 {
        println!("top: {}", computer.ram(sp as u16 - 1));
    }
    Ok(())
}

fn main() {
    let Opt { verbose, command } = Opt::parse();
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if let Err(err) = log::init(level) {
        eprintln!("{}", err);
    }
    if let Err(err) = match command {
        Command::Build {
            input,
            output,
            no_annotate,
            program,
        } => build(input, output, program.options(!no_annotate)),
        Command::Run {
            input,
            steps,
            program,
        } => run(input, steps, program.options(false)),
    } {
        log::error!("{:#}", err);
        process::exit(1);
    }
}
