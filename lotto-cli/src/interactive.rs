use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use lotto_db::db::{fetch_all_draws, fetch_last_draws, insert_draw, latest_round};
use lotto_db::models::{validate_draw, Draw};
use lotto_db::rusqlite::Connection;
use lotto_engine::cache::InMemoryTtlCache;
use lotto_engine::features::report::analyze;
use lotto_engine::generator::{Strategy, SumRange};
use lotto_engine::recommender::Recommender;
use lotto_engine::scorer::compute_scores;
use lotto_engine::{EngineConfig, History};

use crate::display::{display_draws, display_recommendation, display_report, display_scores};

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Add,
    Recommend,
    Scores,
    Analyze,
    History,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "ajouter" | "add" => Some(InteractiveCommand::Add),
        "2" | "recommander" | "recommend" | "rec" => Some(InteractiveCommand::Recommend),
        "3" | "scores" | "score" => Some(InteractiveCommand::Scores),
        "4" | "analyser" | "analyze" | "ana" => Some(InteractiveCommand::Analyze),
        "5" | "historique" | "history" | "hist" => Some(InteractiveCommand::History),
        "6" | "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Mode interactif ──");
    println!("  1. ajouter      Ajouter un tirage");
    println!("  2. recommander  Grilles recommandées");
    println!("  3. scores       Classement des 45 numéros");
    println!("  4. analyser     Rapport statistique");
    println!("  5. historique   Derniers tirages");
    println!("  6. quitter      Quitter");
    println!();
}

pub fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        bail!("Fin de l'entrée");
    }
    Ok(input.trim().to_string())
}

pub fn prompt_with_default(msg: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}] : ", msg, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Lit « 6 numéros + bonus » sur une ligne, ex. `3 11 19 27 35 42 + 8`.
pub fn parse_numbers_line(input: &str) -> Result<([u8; 6], u8)> {
    let (main, bonus) = match input.split_once('+') {
        Some((main, bonus)) => (main, bonus),
        None => bail!("Séparez le bonus par '+' (ex : 3 11 19 27 35 42 + 8)"),
    };
    let nums: Vec<u8> = main
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u8>().with_context(|| format!("Numéro invalide : '{}'", s)))
        .collect::<Result<_>>()?;
    if nums.len() != 6 {
        bail!("Entrez exactement 6 numéros, reçu {}", nums.len());
    }
    let bonus_str = bonus.trim();
    let bonus = bonus_str
        .parse::<u8>()
        .with_context(|| format!("Bonus invalide : '{}'", bonus_str))?;
    let numbers = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
    validate_draw(&numbers, bonus)?;
    Ok((numbers, bonus))
}

fn prompt_numbers() -> Result<([u8; 6], u8)> {
    loop {
        let input = prompt("6 numéros + bonus (1-45, ex : 3 11 19 27 35 42 + 8) : ")?;
        match parse_numbers_line(&input) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => println!("{e:#}. Réessayez."),
        }
    }
}

pub fn cmd_add(conn: &Connection) -> Result<bool> {
    println!("Ajout d'un tirage manuellement\n");

    let next_round = latest_round(conn)?.map_or(1, |r| r + 1);
    let round: u32 = prompt_with_default("Numéro de tour", &next_round.to_string())?
        .parse()
        .context("Numéro de tour invalide")?;
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    let raw_date = prompt_with_default("Date (AAAA-MM-JJ)", &today)?;
    let draw_date = crate::import::normalize_date(&raw_date)?;

    let (numbers, bonus) = prompt_numbers()?;
    let mut draw = Draw::new(round, numbers, bonus);
    draw.draw_date = draw_date;

    println!("\nTirage à insérer :");
    display_draws(std::slice::from_ref(&draw));

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() != "o" {
        println!("Insertion annulée.");
        return Ok(false);
    }
    let inserted = insert_draw(conn, &draw)?;
    if inserted {
        println!("Tirage inséré avec succès.");
    } else {
        println!("Ce tirage existe déjà (doublon ignoré).");
    }
    Ok(inserted)
}

fn load_history(conn: &Connection) -> Result<History> {
    Ok(History::from_vec(fetch_all_draws(conn)?))
}

pub fn run_interactive(conn: &Connection, config: EngineConfig) -> Result<()> {
    println!("Bienvenue dans le mode interactif de lotto !");

    let mut recommender = Recommender::new(config, InMemoryTtlCache::new());
    let mut history = load_history(conn)?;

    loop {
        display_menu();
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break,
        };

        if input.is_empty() {
            continue;
        }

        let outcome = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Add) => cmd_add(conn).and_then(|inserted| {
                if inserted {
                    history = load_history(conn)?;
                    recommender.invalidate_all();
                }
                Ok(())
            }),
            Some(InteractiveCommand::Recommend) => {
                let sets = prompt_with_default("Nombre de grilles", "5")
                    .and_then(|s| s.parse::<usize>().context("Nombre invalide"));
                sets.and_then(|sets| {
                    let rec = recommender.recommend(&history, sets, Strategy::Exhaustive, SumRange::Wide)?;
                    display_recommendation(&rec);
                    Ok(())
                })
            }
            Some(InteractiveCommand::Scores) => {
                display_scores(&compute_scores(&history, recommender.config()), 45);
                Ok(())
            }
            Some(InteractiveCommand::Analyze) => {
                match analyze(&history) {
                    Some(report) => display_report(&report),
                    None => println!("Base vide. Lancez d'abord : lotto import"),
                }
                Ok(())
            }
            Some(InteractiveCommand::History) => fetch_last_draws(conn, 10).map(|draws| display_draws(&draws)),
            None => {
                println!("Commande inconnue : '{}'. Tapez un numéro (1-6) ou un nom de commande.", input);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("Erreur: {e:#}");
        }
    }

    Ok(())
}
