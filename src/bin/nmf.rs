use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use plot3d_nmf::{
    check_grid_dimensions, max_interface_gap, read_neutral_map, read_plot3d_ascii, read_plot3d_binary,
    write_neutral_map, BinaryFormat, Endian, FloatPrecision, NeutralMap,
};

/// Neutral Map File tools for multi-block structured grids.
#[derive(Parser, Debug)]
#[command(name = "nmf", version, about, long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and resolve a neutral map, optionally against its grid
    Check(CheckArgs),
    /// Re-write a neutral map in canonical column layout
    Format {
        input: PathBuf,
        output: PathBuf,
    },
    /// Print resolved counts as JSON
    Summary { input: PathBuf },
}

#[derive(Args, Debug)]
struct CheckArgs {
    input: PathBuf,

    /// Plot3D coordinate file to check against the map
    #[arg(long)]
    grid: Option<PathBuf>,

    /// Binary layout of the grid file (ASCII when omitted)
    #[arg(long, value_enum, requires = "grid")]
    binary: Option<Layout>,

    /// Grid values are single precision
    #[arg(long, requires = "binary")]
    f32: bool,

    /// Grid file is big-endian
    #[arg(long, requires = "binary")]
    big_endian: bool,

    /// Largest accepted distance between glued nodes
    #[arg(long, default_value_t = 1e-6)]
    tol: f64,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Layout {
    Raw,
    Fortran,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn check(args: &CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let map = read_neutral_map(&args.input)?;
    if let Some(path) = &args.grid {
        let grid = match args.binary {
            None => read_plot3d_ascii(path)?,
            Some(layout) => {
                let format = match layout {
                    Layout::Raw => BinaryFormat::Raw,
                    Layout::Fortran => BinaryFormat::Fortran,
                };
                let precision = if args.f32 { FloatPrecision::F32 } else { FloatPrecision::F64 };
                let endian = if args.big_endian { Endian::Big } else { Endian::Little };
                read_plot3d_binary(path, format, precision, endian)?
            }
        };
        check_grid_dimensions(&map, &grid)?;
        let gap = max_interface_gap(&map, &grid)?;
        info!(gap, tol = args.tol, "interface gap measured");
        if gap > args.tol {
            return Err(format!("glued nodes are up to {gap:e} apart (tolerance {:e})", args.tol).into());
        }
    }
    let resolved = map.resolve()?;
    println!(
        "{}: {} blocks, {} cells, {} faces, {} nodes",
        args.input.display(),
        resolved.blocks().len(),
        resolved.n_cells(),
        resolved.n_faces(),
        resolved.n_nodes()
    );
    Ok(())
}

fn reformat(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let map: NeutralMap = read_neutral_map(input)?;
    map.validate()?;
    write_neutral_map(output, &map)?;
    Ok(())
}

fn summary(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let resolved = read_neutral_map(input)?.resolve()?;
    println!("{}", serde_json::to_string_pretty(&resolved.summary())?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let res = match &cli.command {
        Commands::Check(args) => check(args),
        Commands::Format { input, output } => reformat(input, output),
        Commands::Summary { input } => summary(input),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
