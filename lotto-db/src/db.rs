use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;

use crate::models::Draw;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    round_no   INTEGER PRIMARY KEY,
    draw_date  TEXT NOT NULL DEFAULT '',
    num1       INTEGER NOT NULL,
    num2       INTEGER NOT NULL,
    num3       INTEGER NOT NULL,
    num4       INTEGER NOT NULL,
    num5       INTEGER NOT NULL,
    num6       INTEGER NOT NULL,
    bonus      INTEGER NOT NULL
);
";

const SELECT_COLUMNS: &str =
    "SELECT round_no, draw_date, num1, num2, num3, num4, num5, num6, bonus FROM draws";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotto.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let n = draw.sorted_numbers();
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (round_no, draw_date, num1, num2, num3, num4, num5, num6, bonus)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            draw.round,
            draw.draw_date,
            n[0],
            n[1],
            n[2],
            n[3],
            n[4],
            n[5],
            draw.bonus,
        ],
    ).with_context(|| format!("Échec de l'insertion du tirage {}", draw.round))?;
    Ok(changed > 0)
}

fn row_to_draw(row: &Row<'_>) -> rusqlite::Result<Draw> {
    Ok(Draw {
        round: row.get(0)?,
        draw_date: row.get(1)?,
        numbers: [
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
            row.get::<_, u8>(7)?,
        ],
        bonus: row.get(8)?,
    })
}

/// Derniers tirages, du plus récent au plus ancien.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY round_no DESC LIMIT ?1"))?;
    let draws = stmt
        .query_map([limit], row_to_draw)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY round_no DESC"))?;
    let draws = stmt
        .query_map([], row_to_draw)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn latest_round(conn: &Connection) -> Result<Option<u32>> {
    let round = conn
        .query_row("SELECT MAX(round_no) FROM draws", [], |row| row.get::<_, Option<u32>>(0))
        .optional()?
        .flatten();
    Ok(round)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(round: u32) -> Draw {
        Draw {
            round,
            draw_date: format!("2024-01-{:02}", round % 28 + 1),
            numbers: [6, 5, 4, 3, 2, 1],
            bonus: 7,
        }
    }

    #[test]
    fn test_insert_and_count() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 0);

        insert_draw(&conn, &test_draw(1)).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let inserted = insert_draw(&conn, &test_draw(1)).unwrap();
        assert!(inserted);
        let inserted = insert_draw(&conn, &test_draw(1)).unwrap();
        assert!(!inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_fetch_order() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        insert_draw(&conn, &test_draw(1)).unwrap();
        insert_draw(&conn, &test_draw(3)).unwrap();
        insert_draw(&conn, &test_draw(2)).unwrap();

        let draws = fetch_last_draws(&conn, 10).unwrap();
        let rounds: Vec<u32> = draws.iter().map(|d| d.round).collect();
        assert_eq!(rounds, vec![3, 2, 1]);

        let last_two = fetch_last_draws(&conn, 2).unwrap();
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].round, 3);
    }

    #[test]
    fn test_numbers_stored_sorted() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        insert_draw(&conn, &test_draw(1)).unwrap();

        let draws = fetch_all_draws(&conn).unwrap();
        assert_eq!(draws[0].numbers, [1, 2, 3, 4, 5, 6]);
        assert_eq!(draws[0].bonus, 7);
    }

    #[test]
    fn test_latest_round() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(latest_round(&conn).unwrap(), None);

        insert_draw(&conn, &test_draw(12)).unwrap();
        insert_draw(&conn, &test_draw(4)).unwrap();
        assert_eq!(latest_round(&conn).unwrap(), Some(12));
    }
}
