use crate::error::{SfResult, SlateForgeError};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub ga: GaSettings,
    #[command(flatten)]
    pub site: SiteSettings,
    #[command(flatten)]
    pub columns: ColumnMapping,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ga: GaSettings::default(),
            site: SiteSettings::default(),
            columns: ColumnMapping::default(),
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaSettings {
    #[arg(long, default_value_t = 5000, help = "Lineups per generation (sets in set mode)")]
    pub population_size: usize,

    #[arg(long, default_value_t = 20, help = "Maximum generations")]
    pub n_generations: usize,

    #[arg(
        long,
        default_value_t = 10,
        help = "Consecutive unimproved generations before early stop"
    )]
    pub stop_criteria: usize,

    #[arg(long, default_value_t = 5, help = "Elite count = population_size / elite_divisor")]
    pub elite_divisor: usize,

    #[arg(long, default_value = "fittest")]
    pub elite_method: String,

    #[arg(long, default_value = "roulette")]
    pub select_method: String,

    #[arg(long, default_value = "uniform")]
    pub crossover_method: String,

    #[arg(
        long,
        help = "Per-cell mutation probability; unset means adaptive max(0.05, unimproved/50)"
    )]
    pub mutation_rate: Option<f32>,

    #[arg(long, default_value_t = 3)]
    pub tournament_size: usize,

    #[arg(long, help = "RNG seed; identical seed and config reproduce the run exactly")]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 1, help = "Number of lineups to return")]
    pub target_lineups: usize,

    #[arg(long, default_value = "set_based", help = "Multilineup mode: post_processing or set_based")]
    pub mode: String,

    #[arg(long, default_value_t = 0.2)]
    pub diversity_weight: f32,

    #[arg(long, default_value_t = 0.2)]
    pub min_overlap_threshold: f32,

    #[arg(long, default_value = "jaccard", help = "jaccard or hamming")]
    pub diversity_method: String,

    #[arg(long, default_value_t = 25_000, help = "Lineup pool size for set-based mode")]
    pub lineup_pool_size: usize,

    #[arg(long, help = "Fingerprint cluster count; default 8 x target_lineups")]
    pub n_clusters: Option<usize>,

    #[arg(
        long,
        default_value_t = 50.0,
        help = "Scale applied to the mean-similarity penalty in set fitness"
    )]
    pub diversity_penalty_scale: f32,

    #[arg(long, default_value = "medium", help = "low, medium, high or adaptive")]
    pub mutation_intensity: String,

    #[arg(long, default_value_t = false)]
    pub enable_pool_evolution: bool,

    #[arg(long, default_value_t = 10)]
    pub pool_refresh_interval: usize,

    #[arg(long, default_value_t = 0.1)]
    pub pool_evolution_rate: f32,

    #[arg(long, default_value_t = false)]
    pub enable_profiling: bool,

    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl Default for GaSettings {
    fn default() -> Self {
        Self {
            population_size: 5000,
            n_generations: 20,
            stop_criteria: 10,
            elite_divisor: 5,
            elite_method: "fittest".to_string(),
            select_method: "roulette".to_string(),
            crossover_method: "uniform".to_string(),
            mutation_rate: None,
            tournament_size: 3,
            seed: None,
            target_lineups: 1,
            mode: "set_based".to_string(),
            diversity_weight: 0.2,
            min_overlap_threshold: 0.2,
            diversity_method: "jaccard".to_string(),
            lineup_pool_size: 25_000,
            n_clusters: None,
            diversity_penalty_scale: 50.0,
            mutation_intensity: "medium".to_string(),
            enable_pool_evolution: false,
            pool_refresh_interval: 10,
            pool_evolution_rate: 0.1,
            enable_profiling: false,
            verbose: false,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    #[arg(long, default_value_t = 50_000)]
    pub salary_cap: u32,

    #[arg(
        long,
        default_value = "DST:1,QB:1,RB:2,WR:3,TE:1,FLEX:1",
        help = "Slot layout as position:count pairs; declared order is the slot order"
    )]
    pub posmap: String,

    #[arg(long, default_value = "RB,WR,TE", help = "Positions eligible for FLEX slots")]
    pub flex_positions: String,

    #[arg(
        long,
        default_value = "QB:14,RB:8,WR:8,TE:5,DST:4,FLEX:8",
        help = "Minimum projected points per position"
    )]
    pub posfilter: String,

    #[arg(long, default_value_t = 4.0, help = "Global minimum projection at ingest")]
    pub pool_thresh: f32,

    #[arg(
        long,
        help = "Per-slot fitness multipliers, e.g. captain mode 1.5,1,1,1,1,1"
    )]
    pub slot_multipliers: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            salary_cap: 50_000,
            posmap: "DST:1,QB:1,RB:2,WR:3,TE:1,FLEX:1".to_string(),
            flex_positions: "RB,WR,TE".to_string(),
            posfilter: "QB:14,RB:8,WR:8,TE:5,DST:4,FLEX:8".to_string(),
            pool_thresh: 4.0,
            slot_multipliers: None,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    #[arg(long, default_value = "player")]
    pub player_column: String,

    #[arg(long, default_value = "pos")]
    pub position_column: String,

    #[arg(long, default_value = "salary")]
    pub salary_column: String,

    #[arg(long, default_value = "proj")]
    pub points_column: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            player_column: "player".to_string(),
            position_column: "pos".to_string(),
            salary_column: "salary".to_string(),
            points_column: "proj".to_string(),
        }
    }
}

impl SiteSettings {
    pub fn parsed_posmap(&self) -> SfResult<Vec<(String, usize)>> {
        parse_counts(&self.posmap, "posmap")
    }

    pub fn parsed_flex_positions(&self) -> Vec<String> {
        parse_list(&self.flex_positions)
    }

    pub fn parsed_posfilter(&self) -> SfResult<Vec<(String, f32)>> {
        parse_thresholds(&self.posfilter, "posfilter")
    }

    pub fn parsed_slot_multipliers(&self) -> SfResult<Option<Vec<f32>>> {
        match &self.slot_multipliers {
            None => Ok(None),
            Some(s) => {
                let mut out = Vec::new();
                for part in s.split(',') {
                    let v: f32 = part.trim().parse().map_err(|_| {
                        SlateForgeError::Config(format!(
                            "slot_multipliers: '{}' is not a number",
                            part.trim()
                        ))
                    })?;
                    out.push(v);
                }
                Ok(Some(out))
            }
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SfResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SfResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Checks every fatal configuration condition up front. Anything that
    /// fails here is a hard error; nothing downstream re-validates options.
    pub fn validate(&self) -> SfResult<()> {
        use crate::dispatch::OptimizeMode;
        use crate::optimizer::crossover::CrossoverMethod;
        use crate::optimizer::select::SelectMethod;
        use crate::sets::mutate::MutationIntensity;
        use crate::similarity::SimilarityMethod;

        let ga = &self.ga;
        if ga.population_size == 0 {
            return Err(SlateForgeError::Config("population_size must be > 0".into()));
        }
        if ga.elite_divisor == 0 {
            return Err(SlateForgeError::Config("elite_divisor must be > 0".into()));
        }
        if ga.target_lineups == 0 {
            return Err(SlateForgeError::Config("target_lineups must be > 0".into()));
        }
        if let Some(rate) = ga.mutation_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SlateForgeError::Config(format!(
                    "mutation_rate {rate} outside [0, 1]"
                )));
            }
        }
        if ga.diversity_weight < 0.0 {
            return Err(SlateForgeError::Config("diversity_weight must be >= 0".into()));
        }
        if !(0.0..=1.0).contains(&ga.min_overlap_threshold) {
            return Err(SlateForgeError::Config(
                "min_overlap_threshold outside [0, 1]".into(),
            ));
        }
        if ga.tournament_size == 0 {
            return Err(SlateForgeError::Config("tournament_size must be > 0".into()));
        }
        if ga.target_lineups > 1 && ga.lineup_pool_size < ga.target_lineups {
            return Err(SlateForgeError::Config(format!(
                "lineup_pool_size {} is smaller than target_lineups {}",
                ga.lineup_pool_size, ga.target_lineups
            )));
        }

        ga.select_method.parse::<SelectMethod>()?;
        ga.elite_method.parse::<SelectMethod>()?;
        ga.crossover_method.parse::<CrossoverMethod>()?;
        ga.diversity_method.parse::<SimilarityMethod>()?;
        ga.mode.parse::<OptimizeMode>()?;
        ga.mutation_intensity.parse::<MutationIntensity>()?;

        if self.site.salary_cap == 0 {
            return Err(SlateForgeError::Config("salary_cap must be > 0".into()));
        }

        let posmap = self.site.parsed_posmap()?;
        if posmap.is_empty() {
            return Err(SlateForgeError::Config("posmap is empty".into()));
        }
        let lineup_len: usize = posmap.iter().map(|(_, c)| c).sum();
        if lineup_len == 0 {
            return Err(SlateForgeError::Config("posmap has zero total slots".into()));
        }

        let flex_slots: usize = posmap
            .iter()
            .filter(|(p, _)| p == "FLEX")
            .map(|(_, c)| c)
            .sum();
        if flex_slots > 0 && self.site.parsed_flex_positions().is_empty() {
            return Err(SlateForgeError::Config(
                "posmap contains FLEX slots but flex_positions is empty".into(),
            ));
        }

        self.site.parsed_posfilter()?;
        if let Some(mults) = self.site.parsed_slot_multipliers()? {
            if mults.len() != lineup_len {
                return Err(SlateForgeError::Config(format!(
                    "slot_multipliers has {} entries for {} slots",
                    mults.len(),
                    lineup_len
                )));
            }
        }

        Ok(())
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_counts(s: &str, opt: &str) -> SfResult<Vec<(String, usize)>> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, count) = part.split_once(':').ok_or_else(|| {
            SlateForgeError::Config(format!("{opt}: expected position:count, got '{part}'"))
        })?;
        let count: usize = count.trim().parse().map_err(|_| {
            SlateForgeError::Config(format!("{opt}: '{}' is not a count", count.trim()))
        })?;
        let name = name.trim().to_string();
        if out.iter().any(|(n, _)| *n == name) {
            return Err(SlateForgeError::Config(format!(
                "{opt}: position '{name}' listed twice"
            )));
        }
        out.push((name, count));
    }
    Ok(out)
}

fn parse_thresholds(s: &str, opt: &str) -> SfResult<Vec<(String, f32)>> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, thresh) = part.split_once(':').ok_or_else(|| {
            SlateForgeError::Config(format!("{opt}: expected position:points, got '{part}'"))
        })?;
        let thresh: f32 = thresh.trim().parse().map_err(|_| {
            SlateForgeError::Config(format!("{opt}: '{}' is not a number", thresh.trim()))
        })?;
        out.push((name.trim().to_string(), thresh));
    }
    Ok(out)
}
