use crate::config::ColumnMapping;
use crate::error::{SfResult, SlateForgeError};
use crate::types::{PlayerId, PosId};
use std::path::Path;
use tracing::warn;

/// One ingested row, before pool construction. Whatever produced it (CSV,
/// API, test fixture) has already mapped its columns to these fields.
#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub name: String,
    pub team: Option<String>,
    pub position: String,
    pub salary: u32,
    pub points: f32,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: Option<String>,
    pub pos: PosId,
    pub salary: u32,
    pub points: f32,
}

/// The immutable player table for a run.
///
/// Rows are sorted by position so per-position slices are contiguous, and
/// `id` is the dense row index after sorting. The parallel `salaries` and
/// `points` arrays are what the vectorized operators gather from.
#[derive(Debug, Clone)]
pub struct PlayerPool {
    players: Vec<Player>,
    positions: Vec<String>,
    salaries: Vec<u32>,
    points: Vec<f32>,
    dropped_rows: usize,
}

impl PlayerPool {
    pub fn from_csv_path<P: AsRef<Path>>(
        path: P,
        columns: &ColumnMapping,
        pool_thresh: f32,
    ) -> SfResult<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let col = |name: &str| -> SfResult<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                SlateForgeError::Config(format!("input is missing required column '{name}'"))
            })
        };
        let player_col = col(&columns.player_column)?;
        let position_col = col(&columns.position_column)?;
        let salary_col = col(&columns.salary_column)?;
        let points_col = col(&columns.points_column)?;

        let mut rows = Vec::new();
        let mut dropped = 0usize;
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let parsed = (|| {
                let name = record.get(player_col)?.trim();
                let position = record.get(position_col)?.trim();
                let salary: u32 = record.get(salary_col)?.trim().parse().ok()?;
                let points: f32 = record.get(points_col)?.trim().parse().ok()?;
                if name.is_empty() || position.is_empty() || points < 0.0 {
                    return None;
                }
                Some(PlayerRow {
                    name: name.to_string(),
                    team: None,
                    position: position.to_string(),
                    salary,
                    points,
                })
            })();
            match parsed {
                Some(row) => rows.push(row),
                None => {
                    dropped += 1;
                    warn!("dropping malformed player row {}", line + 2);
                }
            }
        }

        Self::build(rows, dropped, pool_thresh)
    }

    pub fn from_rows(rows: Vec<PlayerRow>, pool_thresh: f32) -> SfResult<Self> {
        Self::build(rows, 0, pool_thresh)
    }

    fn build(rows: Vec<PlayerRow>, mut dropped: usize, pool_thresh: f32) -> SfResult<Self> {
        let before = rows.len();
        let mut rows: Vec<PlayerRow> = rows
            .into_iter()
            .filter(|r| r.points >= pool_thresh)
            .collect();
        dropped += before - rows.len();

        if rows.is_empty() {
            return Err(SlateForgeError::Data(format!(
                "no usable player rows remain ({dropped} dropped)"
            )));
        }

        // Grouping by position gives contiguous per-position id ranges.
        rows.sort_by(|a, b| a.position.cmp(&b.position));

        let mut positions: Vec<String> = Vec::new();
        let mut players = Vec::with_capacity(rows.len());
        let mut salaries = Vec::with_capacity(rows.len());
        let mut points = Vec::with_capacity(rows.len());

        for (i, row) in rows.into_iter().enumerate() {
            let pos = match positions.iter().position(|p| *p == row.position) {
                Some(idx) => idx,
                None => {
                    if positions.len() >= PosId::MAX as usize {
                        return Err(SlateForgeError::Data(
                            "too many distinct positions in pool".into(),
                        ));
                    }
                    positions.push(row.position.clone());
                    positions.len() - 1
                }
            };
            salaries.push(row.salary);
            points.push(row.points);
            players.push(Player {
                id: i as PlayerId,
                name: row.name,
                team: row.team,
                pos: pos as PosId,
                salary: row.salary,
                points: row.points,
            });
        }

        Ok(Self {
            players,
            positions,
            salaries,
            points,
            dropped_rows: dropped,
        })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id as usize]
    }

    pub fn salaries(&self) -> &[u32] {
        &self.salaries
    }

    pub fn points(&self) -> &[f32] {
        &self.points
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn position_id(&self, name: &str) -> Option<PosId> {
        self.positions
            .iter()
            .position(|p| p == name)
            .map(|i| i as PosId)
    }

    pub fn position_name(&self, pos: PosId) -> &str {
        &self.positions[pos as usize]
    }

    pub fn position_names(&self) -> &[String] {
        &self.positions
    }

    /// Player count per position, for feasibility reports.
    pub fn position_counts(&self) -> Vec<(String, usize)> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let count = self.players.iter().filter(|p| p.pos as usize == i).count();
                (name.clone(), count)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, pos: &str, salary: u32, points: f32) -> PlayerRow {
        PlayerRow {
            name: name.to_string(),
            team: None,
            position: pos.to_string(),
            salary,
            points,
        }
    }

    #[test]
    fn pool_sorts_by_position_and_assigns_dense_ids() {
        let pool = PlayerPool::from_rows(
            vec![
                row("w1", "WR", 5000, 12.0),
                row("q1", "QB", 7000, 20.0),
                row("w2", "WR", 4000, 9.0),
            ],
            0.0,
        )
        .unwrap();

        assert_eq!(pool.len(), 3);
        for (i, p) in pool.players().iter().enumerate() {
            assert_eq!(p.id as usize, i);
        }
        // QB sorts before WR
        assert_eq!(pool.player(0).name, "q1");
        assert_eq!(pool.position_name(pool.player(1).pos), "WR");
    }

    #[test]
    fn pool_thresh_drops_low_projections() {
        let pool = PlayerPool::from_rows(
            vec![row("a", "QB", 5000, 2.0), row("b", "QB", 5000, 10.0)],
            4.0,
        )
        .unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.dropped_rows(), 1);
    }

    #[test]
    fn empty_pool_is_a_data_error() {
        let err = PlayerPool::from_rows(vec![row("a", "QB", 5000, 2.0)], 4.0).unwrap_err();
        assert!(matches!(err, SlateForgeError::Data(_)));
    }
}
