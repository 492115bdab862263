use std::path::PathBuf;
use std::sync::Arc;

use casematch_core::{
    CaseStatisticsService, CoreConfig, DemographicsBasis, ListCasesRequest, OutcomeResolution,
    PatientInfo, Query,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "casematch")]
#[command(about = "Clinical case similarity search and outcome statistics")]
struct Cli {
    /// JSON corpus file (array of case records)
    #[arg(long, global = true, env = "CASEMATCH_CORPUS_PATH")]
    corpus: Option<PathBuf>,
    /// How matched cases are resolved to outcomes: id or id_then_chief_complaint
    #[arg(long, global = true, env = "CASEMATCH_OUTCOME_RESOLUTION", default_value = "id")]
    outcome_resolution: OutcomeResolution,
    /// Source of demographic breakdowns: illustrative or observed
    #[arg(long, global = true, env = "CASEMATCH_DEMOGRAPHICS", default_value = "illustrative")]
    demographics: DemographicsBasis,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct QueryArgs {
    /// Chief complaint of the presenting patient
    #[arg(default_value = "")]
    chief_complaint: String,
    /// Symptom (repeatable)
    #[arg(long = "symptom", short = 's')]
    symptoms: Vec<String>,
    #[arg(long)]
    age: Option<u32>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    constitution: Option<String>,
    /// Maximum number of results
    #[arg(long)]
    top_k: Option<usize>,
    /// Minimum total score (0-100)
    #[arg(long)]
    min_confidence: Option<f64>,
}

impl QueryArgs {
    fn into_query(self) -> Query {
        Query::new(self.chief_complaint)
            .with_symptoms(self.symptoms.iter().map(String::as_str))
            .with_patient_info(PatientInfo {
                age: self.age,
                gender: self.gender,
                constitution: self.constitution,
            })
            .with_options(self.top_k, self.min_confidence)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank cases similar to a query
    Search(QueryArgs),
    /// Outcome statistics over cases similar to a query
    SuccessStats(QueryArgs),
    /// Corpus summary counts
    Stats,
    /// Page through the corpus
    List {
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
        /// Case-insensitive text filter
        #[arg(long)]
        search: Option<String>,
        /// Exact constitution filter
        #[arg(long)]
        constitution: Option<String>,
    },
    /// Statistics for one formula (prints null if no case uses it)
    Formula {
        /// Formula name or hanja
        name: String,
    },
    /// Compare formulas and recommend one
    Compare {
        /// Formula names, in comparison order
        names: Vec<String>,
    },
    /// Statistics for one symptom
    Symptom {
        /// Symptom name
        name: String,
    },
    /// Demographic breakdowns
    Demographics,
    /// Corpus-wide rollup
    Comprehensive,
    /// Chart data: outcome, formula, symptom, constitution, age, gender, body_heat, body_strength
    Chart {
        chart_type: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays machine-readable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("casematch=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'casematch --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::new(cli.corpus, cli.outcome_resolution, cli.demographics);
    let service = CaseStatisticsService::from_config(Arc::new(cfg));

    match command {
        Commands::Search(args) => print_json(&service.search(&args.into_query()))?,
        Commands::SuccessStats(args) => {
            print_json(&service.similar_case_success_stats(&args.into_query()))?
        }
        Commands::Stats => print_json(&service.statistics())?,
        Commands::List {
            page,
            limit,
            search,
            constitution,
        } => print_json(&service.list_cases(&ListCasesRequest {
            page,
            limit,
            search,
            constitution,
        }))?,
        Commands::Formula { name } => print_json(&service.formula_statistics(&name))?,
        Commands::Compare { names } => print_json(&service.compare_formulas(&names))?,
        Commands::Symptom { name } => print_json(&service.symptom_statistics(&name))?,
        Commands::Demographics => print_json(&service.demographic_statistics())?,
        Commands::Comprehensive => print_json(&service.comprehensive_statistics())?,
        Commands::Chart { chart_type } => print_json(&service.chart_data(&chart_type)?)?,
    }

    Ok(())
}
