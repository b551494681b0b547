use anyhow::{Result, bail};
use clap::Parser;
use warren_core::{Direction, Footprint, LevelGenerator, LevelGraph, generate_level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for grid generation and content rolls
    #[arg(short, long, default_value_t = 2026)]
    seed: u64,

    /// Side length of the square grid
    #[arg(short, long, default_value_t = 5)]
    dim: usize,

    /// Moves to replay from spawn, e.g. "EESSW"
    #[arg(short, long)]
    walk: Option<String>,

    /// Print the generated level as wire JSON instead of playing it
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let footprint = Footprint::Square(args.dim);

    if args.dump {
        let tiles = generate_level(footprint, args.seed);
        println!("{}", serde_json::to_string_pretty(&tiles)?);
        return Ok(());
    }

    let mut generator = LevelGenerator::new(footprint, args.seed);
    let mut graph = LevelGraph::new(args.seed);
    let loaded = graph.load_generated(|| generator.generate());
    if loaded == 0 {
        for event in graph.events() {
            eprintln!("{event:?}");
        }
        bail!("no viable level after retries (seed {}, dim {})", args.seed, args.dim);
    }

    let rolled = graph.roll_contents();
    graph.compute_paths();

    println!("Loaded {loaded} tiles (seed {}, dim {}).", args.seed, args.dim);
    println!(
        "Reachable: {} | Unreachable: {} | Unknown: {}",
        graph.reachable().len(),
        graph.unreachable().len(),
        graph.unknown().len()
    );
    println!("Cells rolled: {rolled}");
    for cell in graph.cells() {
        if cell.has_contents() {
            println!("  tile {:>3}: {:?} via {:?}", cell.id, cell.contents, cell.access_path);
        }
    }

    if let Some(walk) = args.walk {
        println!("Walking {walk:?} from tile {}:", graph.active_id());
        for letter in walk.chars() {
            let direction = Direction::from_char(letter)
                .map_err(|error| anyhow::anyhow!("bad move: {error:?}"))?;
            let from = graph.active_id();
            graph.step(direction);
            println!("  {from} -{}-> {}", direction.as_str(), graph.active_id());
        }
    }

    println!("Snapshot hash: {}", graph.snapshot_hash());
    for event in graph.events() {
        println!("note: {event:?}");
    }

    Ok(())
}
