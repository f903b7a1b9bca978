use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use lotto_db::models::Draw;
use lotto_engine::features::report::AnalysisReport;
use lotto_engine::features::FeatureSet;
use lotto_engine::recommender::Recommendation;
use lotto_engine::scorer::NumberScore;
use lotto_engine::validation::{BacktestReport, SimulationReport};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn percent(rate: f64) -> String {
    format!("{:.2} %", rate * 100.0)
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tour", "Date", "Numéros", "Bonus"]);
    for draw in draws {
        let date = if draw.draw_date.is_empty() {
            "—".to_string()
        } else {
            draw.draw_date.clone()
        };
        table.add_row(vec![
            draw.round.to_string(),
            date,
            join_numbers(&draw.sorted_numbers()),
            format!("{:2}", draw.bonus),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_stats(features: &FeatureSet, window: usize) {
    println!("\n📊 Statistiques sur les {} derniers tirages\n", window);
    println!(
        "Fréquence attendue par numéro : {:.2}",
        features.expected_frequency
    );

    let mut table = new_table(vec![
        "Numéro",
        "Fréquence",
        "Récente",
        "Écart",
        "Cycle moyen",
        "Tendance",
        "Paires",
    ]);

    let mut sorted = features.stats.clone();
    sorted.sort_by(|a, b| {
        b.frequency_overall
            .cmp(&a.frequency_overall)
            .then(a.number.cmp(&b.number))
    });

    for stat in &sorted {
        let trend = if stat.rising {
            Cell::new(format!("{:+} ↑", stat.trend_delta)).fg(Color::Green)
        } else {
            Cell::new(format!("{:+}", stat.trend_delta))
        };
        let cycle = if stat.has_cycle {
            format!("{:.1}", stat.avg_cycle)
        } else {
            "—".to_string()
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", stat.number)),
            Cell::new(stat.frequency_overall),
            Cell::new(stat.frequency_recent),
            Cell::new(stat.gap_since_last_seen),
            Cell::new(cycle),
            trend,
            Cell::new(stat.pair_bonus),
        ]);
    }
    println!("{table}");
}

pub fn display_scores(scores: &[NumberScore], top: usize) {
    println!("\n🎯 Scores composites (top {})\n", top.min(scores.len()));

    let mut table = new_table(vec![
        "#", "Numéro", "Score", "Brut", "Fréq.", "Récente", "Écart", "Cycle", "Tendance",
    ]);
    for (i, s) in scores.iter().take(top).enumerate() {
        let color = if s.score >= 80.0 {
            Color::Green
        } else if s.score <= 20.0 {
            Color::Red
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format!("{:2}", s.number)),
            Cell::new(format!("{:.1}", s.score)).fg(color),
            Cell::new(format!("{:.2}", s.raw_score)),
            Cell::new(s.frequency),
            Cell::new(s.recent_frequency),
            Cell::new(s.last_appeared_gap),
            Cell::new(format!("{:.1}", s.avg_cycle)),
            Cell::new(format!("{:+}", s.trend_delta)),
        ]);
    }
    println!("{table}");
}

pub fn display_recommendation(rec: &Recommendation) {
    println!(
        "\n🎲 Recommandation pour le tour {} ({:?}, somme {:?}){}\n",
        rec.target_round,
        rec.strategy,
        rec.sum_range,
        if rec.from_cache { " [cache]" } else { "" }
    );

    let pool: Vec<u8> = rec.pool.iter().map(|p| p.number).collect();
    println!("Pool (top {}) : {}", pool.len(), join_numbers(&pool));

    if rec.sets.is_empty() {
        println!("Aucune grille : historique vide ou aucune combinaison valide.");
        return;
    }

    let mut table = new_table(vec!["#", "Numéros", "Somme", "Impairs", "Hauts", "AC", "Score moyen", ""]);
    for (i, set) in rec.sets.iter().enumerate() {
        let flag = if set.relaxed {
            Cell::new("relâchée").fg(Color::Yellow)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(join_numbers(&set.numbers)),
            Cell::new(set.sum),
            Cell::new(set.odd_count),
            Cell::new(set.high_count),
            Cell::new(set.ac_value),
            Cell::new(format!("{:.1}", set.avg_score)),
            flag,
        ]);
    }
    println!("{table}");
}

pub fn display_report(report: &AnalysisReport) {
    let numbers_of = |v: &[lotto_engine::features::report::NumberCount]| {
        v.iter()
            .map(|c| format!("{} ({})", c.number, c.count))
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!(
        "\n📈 Analyse de {} tirages (dernier tour {})\n",
        report.total_rounds, report.latest_round
    );

    let mut table = new_table(vec!["Indicateur", "Valeur"]);
    let mut row = |label: &str, value: String| {
        table.add_row(vec![label.to_string(), value]);
    };
    row("Plus fréquents", numbers_of(&report.most_frequent));
    row("Moins fréquents", numbers_of(&report.least_frequent));
    row("Chauds (50 derniers)", join_numbers(&report.hot));
    row("Froids (50 derniers)", join_numbers(&report.cold));
    row(
        "Plus longues absences",
        report
            .not_appeared
            .iter()
            .map(|g| format!("{} ({})", g.number, g.gap))
            .collect::<Vec<_>>()
            .join(", "),
    );
    row("Cycle moyen", format!("{:.2} tours", report.avg_cycle));
    row(
        "Impairs / pairs",
        format!(
            "{} impairs, motif le plus courant {}",
            percent(report.odd_ratio),
            report.most_common_odd_even
        ),
    );
    row(
        "Bas / hauts",
        format!(
            "{} / {}, motif le plus courant {}",
            percent(report.low_ratio),
            percent(report.high_ratio),
            report.most_common_low_high
        ),
    );
    row(
        "Somme",
        format!(
            "moyenne {:.0}, min {}, max {}, conseillée {}-{}",
            report.sum.average,
            report.sum.min,
            report.sum.max,
            report.sum.recommended_min,
            report.sum.recommended_max
        ),
    );
    row(
        "Valeur AC",
        format!("moyenne {:.2}, dernier tirage {}", report.ac.average, report.ac.current),
    );
    row(
        "Consécutifs",
        format!(
            "{} des tirages, {:.2} paires en moyenne",
            percent(report.consecutive_ratio),
            report.avg_consecutive
        ),
    );
    row(
        "Paires fréquentes",
        report
            .top_pairs
            .iter()
            .map(|p| format!("{}-{} ({})", p.pair.0, p.pair.1, p.count))
            .collect::<Vec<_>>()
            .join(", "),
    );
    row("Premiers par tirage", format!("{:.2}", report.prime_average));
    row(
        "Chiffre des unités",
        format!("le plus fréquent {}, le moins fréquent {}", report.end_digit_most, report.end_digit_least),
    );
    row(
        "Reports du tirage précédent",
        format!(
            "0 : {}, 1 : {}, 2+ : {}",
            percent(report.carryover.zero),
            percent(report.carryover.one),
            percent(report.carryover.two_plus)
        ),
    );
    row("En hausse", join_numbers(&report.rising));
    row("En baisse", join_numbers(&report.falling));
    row("Écart moyen entre numéros", format!("{:.2}", report.mean_spacing));
    row(
        "Couleurs",
        report
            .colors
            .iter()
            .map(|(c, r)| format!("{} {}", c, percent(*r)))
            .collect::<Vec<_>>()
            .join(", "),
    );
    row(
        "Doublés (11, 22, 33, 44)",
        format!("{} tirages", report.double_draws),
    );
    row(
        "Paires symétriques (somme 46)",
        format!("{} tirages", report.symmetric_draws),
    );
    println!("{table}");

    let mut ac_table = new_table(vec!["AC", "Tirages"]);
    for (ac, count) in &report.ac.distribution {
        ac_table.add_row(vec![ac.to_string(), count.to_string()]);
    }
    println!("\n── Distribution AC ──");
    println!("{ac_table}");
}

fn hit_table(frequencies: &[f64], counts: &[String], reference: &[f64]) -> Table {
    let mut table = new_table(vec!["Correspondances", "Nombre", "Fréquence", "Théorique"]);
    for (hits, (freq, count)) in frequencies.iter().zip(counts).enumerate() {
        table.add_row(vec![
            Cell::new(hits),
            Cell::new(count),
            Cell::new(percent(*freq)),
            Cell::new(percent(reference.get(hits).copied().unwrap_or(0.0))),
        ]);
    }
    table
}

pub fn display_backtest(report: &BacktestReport, reference: &[f64]) {
    println!(
        "\n🔁 Back-test sur {} points de coupe (pool de {})\n",
        report.checked, report.pool_size
    );
    let checked = report.checked.max(1) as f64;
    let freqs: Vec<f64> = report
        .hit_distribution
        .iter()
        .map(|&c| c as f64 / checked)
        .collect();
    let counts: Vec<String> = report.hit_distribution.iter().map(|c| c.to_string()).collect();
    println!("{}", hit_table(&freqs, &counts, reference));
    println!("Correspondances moyennes : {:.3}", report.avg_hits);
    println!("Taux 4+ : {}", percent(report.hit4_plus_rate));
}

pub fn display_replay(report: &BacktestReport, pool: &[u8], reference: &[f64]) {
    println!(
        "\n📜 Pool actuel rejoué sur {} tirages passés\n",
        report.checked
    );
    println!("Pool : {}", join_numbers(pool));
    let checked = report.checked.max(1) as f64;
    let freqs: Vec<f64> = report
        .hit_distribution
        .iter()
        .map(|&c| c as f64 / checked)
        .collect();
    let counts: Vec<String> = report.hit_distribution.iter().map(|c| c.to_string()).collect();
    println!("{}", hit_table(&freqs, &counts, reference));
    println!("Taux 4+ : {}", percent(report.hit4_plus_rate));
}

pub fn display_simulation(report: &SimulationReport, reference: &[f64], seed: Option<u64>) {
    let source = match seed {
        Some(seed) => format!("seed {}", seed),
        None => "générateur système".to_string(),
    };
    println!(
        "\n🎰 Simulation : {} tirages aléatoires ({})\n",
        report.iterations, source
    );
    let counts: Vec<String> = report.hit_distribution.iter().map(|c| c.to_string()).collect();
    println!("{}", hit_table(&report.probabilities, &counts, reference));
    println!("Correspondances moyennes : {:.3}", report.avg_hits);
    println!("Taux 4+ : {}", percent(report.hit4_plus_rate));
}
