use clap::{Parser, Subcommand};
use cubesearch::distributed::{self, TcpCommunicator};
use cubesearch::puzzle::{CubeMove, CubePuzzle, CubeState};
use cubesearch::search::{DistributedResult, GlobalSolution, SearchConfig};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "cubesearch")]
#[command(about = "cubesearch - Parallel BFS solver for N×N×N cubes")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Where the starting cube comes from
#[derive(clap::Args, Debug)]
struct CubeArgs {
    /// Edge length of the cube
    #[arg(long, short = 'n', default_value = "2")]
    size: usize,
    /// Read the cube's colours from a file (6 * size rows of size colours)
    #[arg(long, conflicts_with_all = ["scramble", "random_scramble"])]
    cube_file: Option<PathBuf>,
    /// Face turns applied to the solved cube, e.g. "0 3 5"
    #[arg(long, conflicts_with = "random_scramble")]
    scramble: Option<String>,
    /// Apply this many random face turns to the solved cube
    #[arg(long)]
    random_scramble: Option<usize>,
    /// Random seed for --random-scramble
    #[arg(long, default_value = "0")]
    seed: u64,
    /// Print the starting cube before searching
    #[arg(long)]
    show_cube: bool,
}

/// Options for each process's worker pool
#[derive(clap::Args, Debug)]
struct PoolArgs {
    /// Number of worker threads per process
    #[arg(long, short = 'j')]
    threads: Option<usize>,
    /// Timeout in seconds for the search
    #[arg(long)]
    timeout: Option<u64>,
    /// Do not expand states at this depth or deeper
    #[arg(long)]
    max_depth: Option<usize>,
    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a cube in this process, optionally as several in-process ranks
    Solve {
        #[command(flatten)]
        cube: CubeArgs,
        #[command(flatten)]
        pool: PoolArgs,
        /// Number of cooperating ranks, each with its own worker pool
        #[arg(long, short = 'p', default_value = "1")]
        processes: usize,
    },
    /// Run one rank of a multi-process solve over TCP
    Node {
        #[command(flatten)]
        cube: CubeArgs,
        #[command(flatten)]
        pool: PoolArgs,
        /// This process's rank (0 listens, the others connect)
        #[arg(long)]
        rank: usize,
        /// Total number of ranks
        #[arg(long)]
        world_size: usize,
        /// Address rank 0 listens on and the other ranks connect to
        #[arg(long)]
        coordinator: SocketAddr,
        /// Seconds a non-root rank keeps retrying its connection
        #[arg(long, default_value = "30")]
        connect_timeout: u64,
    },
}

impl PoolArgs {
    fn search_config(&self) -> SearchConfig {
        let config = SearchConfig::default()
            .with_timeout_option(self.timeout.map(Duration::from_secs))
            .with_max_depth_option(self.max_depth)
            .with_verbose(self.verbose);
        match self.threads {
            Some(threads) => config.with_threads(threads),
            None => config,
        }
    }
}

// --- Cube Loading ---

fn load_cube(args: &CubeArgs) -> Result<(CubePuzzle, CubeState), Box<dyn std::error::Error>> {
    let puzzle = CubePuzzle::new(args.size)?;

    let state = if let Some(path) = &args.cube_file {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        puzzle.parse_state(&text)?
    } else if let Some(scramble) = &args.scramble {
        let faces = puzzle.parse_scramble(scramble)?;
        puzzle.scramble(&faces)?
    } else if let Some(length) = args.random_scramble {
        let (state, moves) = puzzle.random_scramble(length, args.seed);
        let faces: Vec<String> = moves.iter().map(|mv| mv.face.to_string()).collect();
        println!("Scramble (seed {}): {}", args.seed, faces.join(" "));
        state
    } else {
        return Err("one of --cube-file, --scramble or --random-scramble is required".into());
    };

    if args.show_cube {
        println!("Initial cube:");
        print!("{}", state);
    }

    Ok((puzzle, state))
}

// --- Reporting ---

fn report(result: &DistributedResult<CubeState, CubeMove>, elapsed: Duration) {
    match &result.solution {
        GlobalSolution::Found { rank, path, .. } => {
            println!("Rubik's Cube Solved!");
            print!("{}", result.solution.format_steps());
            println!("Moves: {} (found by rank {})", path.len(), rank);
        }
        GlobalSolution::NotFound => println!("Rubik's Cube cannot be solved."),
    }

    println!();
    println!(
        "Search statistics (rank {} of {}):",
        result.rank, result.world_size
    );
    print!("{}", result.local_statistics.format_summary());
    println!("Execution Time: {:.2?}", elapsed);
}

// --- Commands ---

fn run_solve(
    cube: &CubeArgs,
    pool: &PoolArgs,
    processes: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let (puzzle, state) = load_cube(cube)?;
    let config = pool.search_config();
    let processes = processes.max(1);

    println!(
        "Solving {0}x{0}x{0} cube with {1} process(es), {2} thread(s) each",
        puzzle.size(),
        processes,
        config.num_threads
    );

    let start = Instant::now();
    let result = distributed::solve_local_cluster(&puzzle, &state, &config, processes)?;
    report(&result, start.elapsed());
    Ok(())
}

fn run_node(
    cube: &CubeArgs,
    pool: &PoolArgs,
    rank: usize,
    world_size: usize,
    coordinator: SocketAddr,
    connect_timeout: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let (puzzle, state) = load_cube(cube)?;
    let config = pool.search_config();

    let mut comm = if rank == distributed::ROOT_RANK {
        TcpCommunicator::listen(coordinator, world_size)?
    } else {
        TcpCommunicator::connect(
            coordinator,
            rank,
            world_size,
            Duration::from_secs(connect_timeout),
        )?
    };
    log::info!("rank {} of {} connected", rank, world_size);

    let start = Instant::now();
    let result = distributed::search(&puzzle, &state, &config, &mut comm)?;
    report(&result, start.elapsed());
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let args = Args::parse();

    match args.command {
        Commands::Solve {
            cube,
            pool,
            processes,
        } => {
            init_logging(pool.verbose);
            if let Err(e) = run_solve(&cube, &pool, processes) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Node {
            cube,
            pool,
            rank,
            world_size,
            coordinator,
            connect_timeout,
        } => {
            init_logging(pool.verbose);
            if let Err(e) = run_node(&cube, &pool, rank, world_size, coordinator, connect_timeout) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
