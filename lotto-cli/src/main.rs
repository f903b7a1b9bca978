mod display;
mod import;
mod interactive;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lotto_db::db::{count_draws, db_path, fetch_all_draws, fetch_last_draws, migrate, open_db};
use lotto_db::rusqlite::Connection;
use lotto_engine::cache::InMemoryTtlCache;
use lotto_engine::features::report::analyze;
use lotto_engine::features::FeatureSet;
use lotto_engine::generator::{Strategy, SumRange};
use lotto_engine::recommender::Recommender;
use lotto_engine::scorer::{compute_scores, pool_numbers, top_pool};
use lotto_engine::validation::{
    backtest_steps, backtest_with_progress, hypergeometric_probability, replay_pool, simulate,
};
use lotto_engine::{load_config, save_config, EngineConfig, History};

use crate::display::{
    display_backtest, display_draws, display_import_summary, display_recommendation, display_replay,
    display_report, display_scores, display_simulation, display_stats,
};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StrategyArg {
    #[default]
    Exhaustive,
    Incremental,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Exhaustive => Strategy::Exhaustive,
            StrategyArg::Incremental => Strategy::Incremental,
        }
    }
}

#[derive(Parser)]
#[command(name = "lotto", about = "Scores et combinaisons pour le Lotto 6/45")]
struct Cli {
    /// Fichier de configuration JSON (poids, fenêtres, pool)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Chemin de la base SQLite (défaut : data/lotto.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer des tirages (CSV séparé par ';' ou JSON)
    Import {
        /// Chemin vers le fichier
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Ajouter un tirage manuellement
    Add,

    /// Statistiques par numéro (fréquences, écarts, cycles, tendance)
    Stats {
        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: usize,
    },

    /// Rapport statistique complet
    Analyze,

    /// Classement des numéros par score composite
    Scores {
        /// Nombre de numéros affichés
        #[arg(short, long, default_value = "20")]
        top: usize,
    },

    /// Générer des grilles recommandées
    Recommend {
        /// Nombre de grilles
        #[arg(short, long, default_value = "5")]
        sets: usize,

        /// Stratégie de génération
        #[arg(long, default_value = "exhaustive")]
        strategy: StrategyArg,

        /// Fourchette de somme resserrée (115-160)
        #[arg(long)]
        tight: bool,
    },

    /// Rejouer le score sur l'historique
    Backtest {
        /// Tirages ignorés avant le premier point de coupe
        #[arg(short, long)]
        warmup: Option<usize>,
    },

    /// Simuler des tirages aléatoires contre le pool actuel
    Simulate {
        /// Nombre de tirages simulés
        #[arg(short, long, default_value = "100000")]
        iterations: u64,

        /// Seed pour la reproductibilité (défaut : date du jour AAAAMMJJ)
        #[arg(long, conflicts_with = "entropy")]
        seed: Option<u64>,

        /// Générateur initialisé par le système au lieu d'un seed
        #[arg(long)]
        entropy: bool,
    },

    /// Écrire la configuration par défaut dans un fichier JSON
    InitConfig {
        #[arg(short, long, default_value = "lotto-config.json")]
        output: PathBuf,
    },

    /// Mode interactif
    Interactive,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Impossible de charger la configuration {:?}", path))?,
        None => EngineConfig::default(),
    };

    if let Command::InitConfig { output } = &cli.command {
        return cmd_init_config(output);
    }

    let path = cli.db.clone().unwrap_or_else(db_path);
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Add => interactive::cmd_add(&conn).map(|_| ()),
        Command::Stats { window } => cmd_stats(&conn, &config, window),
        Command::Analyze => cmd_analyze(&conn),
        Command::Scores { top } => cmd_scores(&conn, &config, top),
        Command::Recommend {
            sets,
            strategy,
            tight,
        } => cmd_recommend(&conn, config, sets, strategy.into(), tight),
        Command::Backtest { warmup } => cmd_backtest(&conn, config, warmup),
        Command::Simulate {
            iterations,
            seed,
            entropy,
        } => cmd_simulate(&conn, &config, iterations, seed, entropy),
        Command::InitConfig { .. } => Ok(()),
        Command::Interactive => interactive::run_interactive(&conn, config),
    }
}

/// Seed déterministe basé sur la date du jour (AAAAMMJJ).
fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    today.year() as u64 * 10_000 + today.month() as u64 * 100 + today.day() as u64
}

/// Charge l'historique ; `None` (avec message) si la base est vide.
fn load_history(conn: &Connection) -> Result<Option<History>> {
    if count_draws(conn)? == 0 {
        println!("Base vide. Lancez d'abord : lotto import --file <fichier>");
        return Ok(None);
    }
    let history = History::from_vec(fetch_all_draws(conn)?);
    info!(draws = history.len(), latest = history.latest_round(), "historique chargé");
    Ok(Some(history))
}

fn cmd_init_config(output: &Path) -> Result<()> {
    save_config(&EngineConfig::default(), output)
        .with_context(|| format!("Impossible d'écrire {:?}", output))?;
    println!("Configuration par défaut écrite dans {}", output.display());
    Ok(())
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_file(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    if count_draws(conn)? == 0 {
        println!("Base vide. Lancez d'abord : lotto import --file <fichier>");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, config: &EngineConfig, window: usize) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let recent = history.recent(window);
    let features = FeatureSet::extract(recent, config);
    display_stats(&features, recent.len());
    Ok(())
}

fn cmd_analyze(conn: &Connection) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    if let Some(report) = analyze(&history) {
        display_report(&report);
    }
    Ok(())
}

fn cmd_scores(conn: &Connection, config: &EngineConfig, top: usize) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let scores = compute_scores(&history, config);
    display_scores(&scores, top);
    Ok(())
}

fn cmd_recommend(
    conn: &Connection,
    config: EngineConfig,
    sets: usize,
    strategy: Strategy,
    tight: bool,
) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let sum_range = if tight { SumRange::Recommended } else { SumRange::Wide };
    let mut recommender = Recommender::new(config, InMemoryTtlCache::new());
    let rec = recommender.recommend(&history, sets, strategy, sum_range)?;
    display_recommendation(&rec);
    Ok(())
}

fn cmd_backtest(conn: &Connection, mut config: EngineConfig, warmup: Option<usize>) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    if let Some(warmup) = warmup {
        config.backtest_warmup = warmup;
    }

    let total = backtest_steps(&history, config.backtest_warmup) as u64;
    println!(
        "Back-test sur {} tirages ({} points de coupe)...",
        history.len(),
        total
    );
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let report = backtest_with_progress(&history, &config, |done, _| pb.set_position(done as u64));
    pb.finish_and_clear();

    let reference: Vec<f64> = (0..=6)
        .map(|h| hypergeometric_probability(config.pool_size, h))
        .collect();
    display_backtest(&report, &reference);

    let current = pool_numbers(&top_pool(&compute_scores(&history, &config), config.pool_size));
    let replay = replay_pool(&history, &current);
    display_replay(&replay, &current, &reference);
    Ok(())
}

fn cmd_simulate(
    conn: &Connection,
    config: &EngineConfig,
    iterations: u64,
    seed: Option<u64>,
    entropy: bool,
) -> Result<()> {
    let Some(history) = load_history(conn)? else {
        return Ok(());
    };
    let scores = compute_scores(&history, config);
    let pool = pool_numbers(&top_pool(&scores, config.pool_size));

    let (report, seed_label) = if entropy {
        (simulate(&pool, iterations, &mut rand::rng())?, None)
    } else {
        let seed = seed.unwrap_or_else(date_seed);
        (simulate(&pool, iterations, &mut StdRng::seed_from_u64(seed))?, Some(seed))
    };

    let reference: Vec<f64> = (0..=6)
        .map(|h| hypergeometric_probability(pool.len(), h))
        .collect();
    display_simulation(&report, &reference, seed_label);
    Ok(())
}
