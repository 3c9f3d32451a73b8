use clap::Parser;
use extract_errors::*;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

/// Count hashes across sketch files and report the ones seen exactly once.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input sketch (.sig JSON) paths
    #[arg(required = true)]
    sig_paths: Vec<PathBuf>,

    /// K-mer size of the signatures to count
    #[arg(long, default_value_t = 31)]
    ksize: u32,

    /// Worker threads for counting
    #[arg(long, default_value_t = 1)]
    num_threads: usize,

    /// Counter shard bits (2^bits shards)
    #[arg(long, default_value_t = 10)]
    shard_bits: u8,

    /// Pull files from a shared pool instead of fixed per-thread ranges
    #[arg(long, default_value_t = false)]
    work_stealing: bool,

    /// Log and skip unreadable or malformed sketches instead of aborting
    #[arg(long, default_value_t = false)]
    skip_unreadable: bool,

    /// Write `<hash>\t<count>` lines for every counted hash
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Write the error hashes, one per line
    #[arg(long)]
    errors_out: Option<PathBuf>,

    /// Sketch to filter against the error set (repeat for several)
    #[arg(long, action = clap::ArgAction::Append)]
    filter: Vec<PathBuf>,

    /// Reference sketch whose every hash is an error (used with --filter)
    #[arg(long)]
    reference: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    SimpleLogger::new().with_level(level).init()?;

    let partitioning = if args.work_stealing {
        Partitioning::WorkStealing
    } else {
        Partitioning::Static
    };
    let cfg = CounterConfig::default()
        .with_ksize(args.ksize)
        .with_threads(args.num_threads)
        .with_shard_bits(args.shard_bits)
        .partitioning(partitioning)
        .skip_unreadable(args.skip_unreadable);

    let mut counter = HashesCounter::new(cfg, args.sig_paths)?;
    counter.start_errors_extraction()?;

    let errors = counter.get_error_hashes();
    println!("{}", errors.len());

    if let Some(path) = &args.errors_out {
        write_hash_list(errors, path)?;
    }
    if let Some(path) = &args.dump {
        counter.dump_kmers_to_file(path)?;
    }

    if !args.filter.is_empty() {
        let reference = args.reference.unwrap_or_default();
        counter.initialize_sigs_filtration(&reference)?;
        for sig in &args.filter {
            let overlap = counter.filter_sig_return_kmers(sig)?;
            println!("{}\t{}", sig.display(), overlap.len());
        }
    }

    Ok(())
}
