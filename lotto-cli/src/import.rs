use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use lotto_db::db::insert_draw;
use lotto_db::models::{validate_draw, Draw};
use lotto_db::rusqlite::Connection;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Enregistrement du format d'échange JSON (`round_no`, `draw_date`, `num1`..`num6`, `bonus`).
#[derive(Debug, Deserialize)]
struct SeedRecord {
    round_no: u32,
    #[serde(default)]
    draw_date: String,
    num1: u8,
    num2: u8,
    num3: u8,
    num4: u8,
    num5: u8,
    num6: u8,
    bonus: u8,
}

impl SeedRecord {
    fn into_draw(self) -> Result<Draw> {
        build_draw(
            self.round_no,
            &self.draw_date,
            [self.num1, self.num2, self.num3, self.num4, self.num5, self.num6],
            self.bonus,
        )
    }
}

fn build_draw(round: u32, raw_date: &str, numbers: [u8; 6], bonus: u8) -> Result<Draw> {
    validate_draw(&numbers, bonus).with_context(|| format!("Tirage {} invalide", round))?;
    if round == 0 {
        bail!("Numéro de tour nul");
    }
    let mut draw = Draw::new(round, numbers, bonus);
    draw.draw_date = normalize_date(raw_date)?;
    Ok(draw)
}

/// Date au format ISO `AAAA-MM-JJ` ; chaîne vide acceptée.
pub fn normalize_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date.format("%Y-%m-%d").to_string());
        }
    }
    bail!("Format de date invalide: '{}'", raw)
}

fn parse_record(record: &csv::StringRecord) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };
    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let round_str = get(0)?;
    let round = round_str
        .parse::<u32>()
        .with_context(|| format!("Numéro de tour invalide: '{}'", round_str))?;
    let numbers = [get_u8(2)?, get_u8(3)?, get_u8(4)?, get_u8(5)?, get_u8(6)?, get_u8(7)?];
    build_draw(round, &get(1)?, numbers, get_u8(8)?)
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl ImportResult {
    fn record(&mut self, conn: &Connection, parsed: Result<Draw>) {
        self.total_records += 1;
        match parsed {
            Ok(draw) => match insert_draw(conn, &draw) {
                Ok(true) => self.inserted += 1,
                Ok(false) => self.skipped += 1,
                Err(e) => {
                    warn!(line = self.total_records, "insertion impossible : {e:#}");
                    self.errors += 1;
                }
            },
            Err(e) => {
                warn!(line = self.total_records, "enregistrement ignoré : {e:#}");
                self.errors += 1;
            }
        }
    }
}

/// Importe un fichier JSON (extension `.json`) ou CSV séparé par `;`.
pub fn import_file(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        import_json(conn, path)
    } else {
        import_csv(conn, path)
    }
}

/// CSV avec en-tête : `round_no;draw_date;num1;num2;num3;num4;num5;num6;bonus`.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult::default();
    for record_result in reader.records() {
        let parsed = record_result
            .context("Erreur de lecture")
            .and_then(|record| parse_record(&record));
        result.record(&tx, parsed);
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

pub fn import_json(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let records: Vec<SeedRecord> =
        serde_json::from_str(&content).with_context(|| format!("JSON invalide dans {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult::default();
    for record in records {
        result.record(&tx, record.into_draw());
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use lotto_db::db::{count_draws, fetch_all_draws, migrate};

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2002-12-07").unwrap(), "2002-12-07");
        assert_eq!(normalize_date("2002.12.07").unwrap(), "2002-12-07");
        assert_eq!(normalize_date("07/12/2002").unwrap(), "2002-12-07");
        assert_eq!(normalize_date("  ").unwrap(), "");
        assert!(normalize_date("7 déc. 2002").is_err());
    }

    #[test]
    fn test_import_csv_counts() {
        let file = temp_file(
            ".csv",
            "round_no;draw_date;num1;num2;num3;num4;num5;num6;bonus\n\
             1;2002-12-07;10;23;29;33;37;40;16\n\
             2;2002-12-14;9;13;21;25;32;42;2\n\
             2;2002-12-14;9;13;21;25;32;42;2\n\
             3;2002-12-21;1;2;3;4;5;46;7\n",
        );
        let conn = memory_db();
        let result = import_file(&conn, file.path()).unwrap();
        assert_eq!(
            result,
            ImportResult {
                total_records: 4,
                inserted: 2,
                skipped: 1,
                errors: 1,
            }
        );
        assert_eq!(count_draws(&conn).unwrap(), 2);
    }

    #[test]
    fn test_import_json_seed_format() {
        let file = temp_file(
            ".json",
            r#"[
                {"round_no": 2, "draw_date": "2002-12-14", "num1": 42, "num2": 9, "num3": 13,
                 "num4": 21, "num5": 25, "num6": 32, "bonus": 2},
                {"round_no": 1, "draw_date": "2002-12-07", "num1": 10, "num2": 23, "num3": 29,
                 "num4": 33, "num5": 37, "num6": 40, "bonus": 16}
            ]"#,
        );
        let conn = memory_db();
        let result = import_file(&conn, file.path()).unwrap();
        assert_eq!(result.inserted, 2);
        assert_eq!(result.errors, 0);

        let draws = fetch_all_draws(&conn).unwrap();
        assert_eq!(draws[0].round, 2);
        assert_eq!(draws[0].numbers, [9, 13, 21, 25, 32, 42]);
        assert_eq!(draws[1].draw_date, "2002-12-07");
    }

    #[test]
    fn test_import_json_rejects_malformed_file() {
        let file = temp_file(".json", "{ pas du json");
        let conn = memory_db();
        assert!(import_file(&conn, file.path()).is_err());
    }
}
