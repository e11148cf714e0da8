// ========================================================================================
//
//                         THE ORCHESTRATOR: HAPORDER
//
// ========================================================================================
//
// This binary is the conductor of a short, strictly sequential pipeline: load the
// three input files, produce one seeded conditioning order plus its reverse, and
// write the output for one recipient position in both directions. It owns all
// resources, runs every phase on the main thread, and converts the first error
// any phase reports into a non-zero exit.
//
// Parallelism across recipients is a caller concern: one process handles one
// recipient position, and a batch run launches independent processes with
// disjoint positions.

use clap::Parser;
use haporder::output::{self, Direction};
use haporder::prepare;
use haporder::shuffle;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

// ========================================================================================
//                         COMMAND-LINE INTERFACE DEFINITION
// ========================================================================================

#[derive(Parser, Debug)]
#[clap(
    name = "haporder",
    version,
    about = "Generates randomized conditioning orders and per-recipient haplotype files \
             for an imputation pipeline."
)]
struct Args {
    /// Path to the haplotype source file (.hap).
    #[clap(long)]
    hap: PathBuf,

    /// Path to the strain list file; the first tab-delimited field of each line
    /// is a strain name, indexed 1-based in file order.
    #[clap(long = "strain-list")]
    strain_list: PathBuf,

    /// Path to the ordering list file naming the strains whose conditioning
    /// order is randomized.
    #[clap(long)]
    ordering: PathBuf,

    /// Output prefix; the per-direction output directories derive from it.
    #[clap(long = "out-prefix")]
    out_prefix: String,

    /// Randomization-round counter; decorrelates runs that share a base seed.
    #[clap(long)]
    round: u32,

    /// 1-based recipient position within the conditioning order. Position 1
    /// writes the strain-order listing instead of a haplotype file.
    #[clap(long)]
    recipient: usize,

    /// Base seed for the shuffle; the effective seed is seed + round.
    #[clap(long)]
    seed: u64,
}

// ========================================================================================
//                           THE MAIN ORCHESTRATION LOGIC
// ========================================================================================

fn main() {
    env_logger::init();
    let start_time = Instant::now();
    let args = Args::parse();

    // --- Phase 1: Load inputs ---
    let prep = match prepare::prepare_inputs(&args.hap, &args.strain_list, &args.ordering) {
        Ok(res) => res,
        Err(e) => {
            eprintln!("Fatal error while loading inputs: {e}");
            process::exit(1);
        }
    };
    eprintln!(
        "> Loaded {} haplotype sequences, {} indexed strains, ordering of {}.",
        prep.panel.num_sequences(),
        prep.strain_index.len(),
        prep.ordering.len()
    );

    // --- Phase 2: Randomize the conditioning order ---
    let orders = shuffle::conditioning_orders(&prep.ordering, args.seed, args.round);
    eprintln!(
        "> Shuffled {} strains (seed {}, round {}).",
        orders.forward.len(),
        args.seed,
        args.round
    );

    // --- Phase 3: Output directories ---
    // Both directories are created up front, even when only the listing branch
    // fires; pre-existing directories are reused untouched.
    let forward_dir = output::ordering_dir(&args.out_prefix, args.seed, args.round, Direction::Forward);
    let reverse_dir = output::ordering_dir(&args.out_prefix, args.seed, args.round, Direction::Reverse);
    for dir in [&forward_dir, &reverse_dir] {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Fatal error creating output directory '{}': {e}", dir.display());
            process::exit(1);
        }
    }

    // --- Phase 4: Write both directions for the requested recipient ---
    for (dir, order) in [(&forward_dir, &orders.forward), (&reverse_dir, &orders.reverse)] {
        let listing = output::strain_order_path(dir);
        match output::write_recipient_file(
            dir,
            &listing,
            order,
            args.recipient,
            &prep.panel,
            &prep.strain_index,
        ) {
            Ok(Some(path)) => eprintln!("> Wrote {}", path.display()),
            Ok(None) => eprintln!("> Wrote {}", listing.display()),
            Err(e) => {
                eprintln!("Fatal error while writing output: {e}");
                process::exit(1);
            }
        }
    }

    eprintln!("\nDone. Total execution time: {:.2?}", start_time.elapsed());
}
