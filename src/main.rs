use ccsort::compare::compare_seed_files;
use ccsort::error::{config_error, CcError};
use ccsort::input::InputConfig;
use ccsort::partition::Method;
use ccsort::util::logger::init_logger_with_level;
use ccsort::{run_job, JobConfig};
use clap::{arg_enum, value_t, App, Arg, ArgMatches};
use log::{info, Level};
use std::str::FromStr;

arg_enum! {
    #[derive(PartialEq, Debug)]
    pub enum LogLevel {
        Error,
        Warn,
        Info,
        Debug,
        Trace,
    }
}

fn main() -> Result<(), CcError> {
    // Parse command line arguments.
    let matches = App::new("ccsort")
        .about("Distributed connected components over globally sorted tuples")
        .arg(
            Arg::from_usage("-l, --loglevel=[LEVEL] 'Set the log level'")
                .possible_values(&LogLevel::variants())
                .case_insensitive(true),
        )
        .arg(
            Arg::from_usage("--scale=[INT] 'log2 of the generated vertex count'")
                .required_unless_one(&["fastq", "compare"]),
        )
        .arg(
            Arg::from_usage("--edgefactor=[INT] 'Average degree of the generated graph'")
                .required_unless_one(&["fastq", "compare"]),
        )
        .arg(
            Arg::from_usage("--method=[METHOD] 'Variant of the partitioner to run'")
                .possible_values(&["standard", "inactive", "loadbalance"])
                .required_unless("compare"),
        )
        .arg(
            Arg::from_usage("--seedfile=[PATH] 'Prefix of the component seed output file'")
                .required_unless("compare"),
        )
        .arg(Arg::from_usage("--peers=[INT] 'Number of peers in the group'").default_value("4"))
        .arg(Arg::from_usage("--fastq=[PATH] 'Read k-mer tuples from a FASTQ file'"))
        .arg(
            Arg::from_usage("--kmerlen=[INT] 'k-mer length for FASTQ input'")
                .default_value("31"),
        )
        .arg(
            Arg::from_usage("--seed=[INT] 'Seed for the graph generator'")
                .default_value("20150420"),
        )
        .arg(
            Arg::from_usage("--compare=[FILE]... 'Compare two seed files and exit'")
                .number_of_values(2),
        )
        .get_matches();

    setup_logger(&matches)?;

    if let Some(mut files) = matches.values_of("compare") {
        let first = files.next().expect("clap enforces two files");
        let second = files.next().expect("clap enforces two files");
        return compare_seed_files(first, second);
    }

    let config = build_config(&matches)?;
    let summary = run_job(&config)?;
    info!(
        "Finished with {} components after {} supersteps",
        summary.seed_count, summary.supersteps
    );
    Ok(())
}

fn build_config(matches: &ArgMatches) -> Result<JobConfig, CcError> {
    let peers = value_t!(matches, "peers", usize)
        .map_err(|e| config_error(format!("Invalid --peers: {}", e)))?;
    if peers == 0 {
        return Err(config_error("--peers must be at least 1".to_owned()));
    }

    let method = Method::from_str(matches.value_of("method").expect("clap enforces --method"))?;

    let input = if let Some(path) = matches.value_of("fastq") {
        let kmer_len = value_t!(matches, "kmerlen", usize)
            .map_err(|e| config_error(format!("Invalid --kmerlen: {}", e)))?;
        if kmer_len == 0 || kmer_len > 31 {
            return Err(config_error("--kmerlen must be between 1 and 31".to_owned()));
        }
        InputConfig::Fastq { path: path.to_owned(), kmer_len }
    } else {
        let scale = value_t!(matches, "scale", u32)
            .map_err(|e| config_error(format!("Invalid --scale: {}", e)))?;
        if scale == 0 || scale > 30 {
            return Err(config_error("--scale must be between 1 and 30".to_owned()));
        }
        let edgefactor = value_t!(matches, "edgefactor", usize)
            .map_err(|e| config_error(format!("Invalid --edgefactor: {}", e)))?;
        if edgefactor == 0 {
            return Err(config_error("--edgefactor must be at least 1".to_owned()));
        }
        let seed = value_t!(matches, "seed", u64)
            .map_err(|e| config_error(format!("Invalid --seed: {}", e)))?;
        InputConfig::Kronecker { scale, edgefactor, seed }
    };

    let seed_file =
        matches.value_of("seedfile").expect("clap enforces --seedfile").to_owned();
    Ok(JobConfig { peers, method, input, seed_file })
}

fn setup_logger(matches: &ArgMatches) -> Result<(), CcError> {
    // Set log level.
    let log_level = match value_t!(matches, "loglevel", LogLevel).unwrap_or(LogLevel::Info) {
        LogLevel::Error => Level::Error,
        LogLevel::Warn => Level::Warn,
        LogLevel::Info => Level::Info,
        LogLevel::Debug => Level::Debug,
        LogLevel::Trace => Level::Trace,
    };
    init_logger_with_level(log_level)
}
