//! `termweight` CLI: inspect weighting schemes, their bounds and their wire encoding.

#[cfg(feature = "cli")]
use clap::{Args as ClapArgs, Parser, Subcommand};
#[cfg(feature = "cli")]
use termweight::stats::{DocCount, Scope, Stat, StatSet, TermCount, TotalLength};
#[cfg(feature = "cli")]
use termweight::{Scheme, StatsSource, TermScorer, TermStats};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(author, version, about = "Term weighting scheme inspector", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the registered scheme names.
    Schemes,

    /// Initialize a scheme and score one document.
    Score {
        /// Scheme and parameters, e.g. "bm25 1.2 0 1 0.75 0.5".
        #[arg(short, long, default_value = "bm25")]
        scheme: String,

        #[command(flatten)]
        collection: CollectionArgs,

        /// Within-document frequency of the term.
        #[arg(long, default_value_t = 1)]
        wdf: TermCount,

        /// Document length.
        #[arg(long, default_value_t = 1)]
        doclen: TermCount,

        /// Distinct terms in the document.
        #[arg(long, default_value_t = 1)]
        unique_terms: TermCount,

        /// Largest wdf of any term in the document.
        #[arg(long, default_value_t = 1)]
        wdf_doc_max: TermCount,

        /// Scaling factor from the query tree.
        #[arg(long, default_value_t = 1.0)]
        factor: f64,
    },

    /// Print a scheme's name and hex-encoded parameters.
    Serialize {
        #[arg(short, long)]
        scheme: String,
    },

    /// Rebuild a scheme from its name and hex-encoded parameters.
    Deserialize {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        hex: String,
    },
}

/// Collection statistics. Shard and database bounds are given separately.
#[cfg(feature = "cli")]
#[derive(ClapArgs, Debug, Clone)]
struct CollectionArgs {
    #[arg(long, default_value_t = 1000)]
    collection_size: DocCount,
    #[arg(long, default_value_t = 0)]
    rset_size: DocCount,
    #[arg(long, default_value_t = 40.0)]
    average_length: f64,
    #[arg(long, default_value_t = 10)]
    termfreq: DocCount,
    #[arg(long, default_value_t = 0)]
    reltermfreq: DocCount,
    #[arg(long, default_value_t = 20)]
    collection_freq: TermCount,
    #[arg(long, default_value_t = 40_000)]
    total_length: TotalLength,
    #[arg(long, default_value_t = 1)]
    query_length: TermCount,
    #[arg(long, default_value_t = 1)]
    wqf: TermCount,

    #[arg(long, default_value_t = 1)]
    doclen_min: TermCount,
    #[arg(long, default_value_t = 500)]
    doclen_max: TermCount,
    #[arg(long, default_value_t = 20)]
    wdf_max: TermCount,
    #[arg(long, default_value_t = 1)]
    unique_terms_min: TermCount,
    #[arg(long, default_value_t = 500)]
    unique_terms_max: TermCount,

    #[arg(long, default_value_t = 1)]
    db_doclen_min: TermCount,
    #[arg(long, default_value_t = 500)]
    db_doclen_max: TermCount,
    #[arg(long, default_value_t = 20)]
    db_wdf_max: TermCount,
    #[arg(long, default_value_t = 1)]
    db_unique_terms_min: TermCount,
    #[arg(long, default_value_t = 500)]
    db_unique_terms_max: TermCount,
}

#[cfg(feature = "cli")]
impl StatsSource for CollectionArgs {
    fn collection_size(&self) -> DocCount {
        self.collection_size
    }

    fn rset_size(&self) -> DocCount {
        self.rset_size
    }

    fn average_length(&self) -> f64 {
        self.average_length
    }

    fn total_length(&self) -> TotalLength {
        self.total_length
    }

    fn termfreq(&self, _term: &str) -> DocCount {
        self.termfreq
    }

    fn reltermfreq(&self, _term: &str) -> DocCount {
        self.reltermfreq
    }

    fn collection_freq(&self, _term: &str) -> TermCount {
        self.collection_freq
    }

    fn wdf_upper_bound(&self, _term: &str, scope: Scope) -> TermCount {
        match scope {
            Scope::Shard => self.wdf_max,
            Scope::Database => self.db_wdf_max,
        }
    }

    fn doclength_lower_bound(&self, scope: Scope) -> TermCount {
        match scope {
            Scope::Shard => self.doclen_min,
            Scope::Database => self.db_doclen_min,
        }
    }

    fn doclength_upper_bound(&self, scope: Scope) -> TermCount {
        match scope {
            Scope::Shard => self.doclen_max,
            Scope::Database => self.db_doclen_max,
        }
    }

    fn unique_terms_lower_bound(&self, scope: Scope) -> TermCount {
        match scope {
            Scope::Shard => self.unique_terms_min,
            Scope::Database => self.db_unique_terms_min,
        }
    }

    fn unique_terms_upper_bound(&self, scope: Scope) -> TermCount {
        match scope {
            Scope::Shard => self.unique_terms_max,
            Scope::Database => self.db_unique_terms_max,
        }
    }
}

#[cfg(feature = "cli")]
fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(feature = "cli")]
fn from_hex(s: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let s = s.trim();
    if !s.is_ascii() || s.len() % 2 != 0 {
        return Err(format!("invalid hex string {s:?}").into());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(Into::into))
        .collect()
}

#[cfg(feature = "cli")]
fn stat_names(set: StatSet) -> String {
    set.iter().map(Stat::name).collect::<Vec<_>>().join(" ")
}

/// Zero the per-document values the scheme did not negotiate.
#[cfg(feature = "cli")]
fn masked(needed: StatSet, stat: Stat, value: TermCount) -> TermCount {
    if needed.contains(stat) {
        value
    } else {
        0
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "cli")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();

        let args = Args::parse();

        match args.command {
            Commands::Schemes => {
                for name in Scheme::names() {
                    println!("{name}");
                }
            }
            Commands::Score {
                scheme,
                collection,
                wdf,
                doclen,
                unique_terms,
                wdf_doc_max,
                factor,
            } => {
                let scheme = Scheme::create(&scheme)?;
                let needed = scheme.stats_needed();
                let stats = TermStats::gather(
                    &collection,
                    "",
                    collection.query_length,
                    collection.wqf,
                    needed,
                );
                tracing::debug!(?stats, "gathered statistics");

                let scorer = scheme.init(&stats, factor);
                let extra = scheme.init_extra(&stats);
                let wdf = masked(needed, Stat::Wdf, wdf);
                let doclen = masked(needed, Stat::DocLength, doclen);
                let unique_terms = masked(needed, Stat::UniqueTerms, unique_terms);
                let wdf_doc_max = masked(needed, Stat::WdfDocMax, wdf_doc_max);

                println!("scheme: {}", scheme.name());
                println!("stats: {}", stat_names(needed));
                println!(
                    "score_term: {}",
                    scorer.score_term(wdf, doclen, unique_terms, wdf_doc_max)
                );
                println!("max_score_term: {}", scorer.max_score_term());
                println!(
                    "score_extra: {}",
                    extra.score_extra(doclen, unique_terms, wdf_doc_max)
                );
                println!("max_score_extra: {}", extra.max_score_extra());
            }
            Commands::Serialize { scheme } => {
                let scheme = Scheme::create(&scheme)?;
                let bytes = scheme.serialize_parameters()?;
                println!("name: {}", scheme.name());
                println!("parameters: {}", to_hex(&bytes));
            }
            Commands::Deserialize { name, hex } => {
                let bytes = from_hex(&hex)?;
                let scheme = Scheme::deserialize(&name, &bytes)?;
                println!("{scheme:?}");
            }
        }
    }

    #[cfg(not(feature = "cli"))]
    println!("CLI feature is disabled. Build with --features cli to enable.");

    Ok(())
}
