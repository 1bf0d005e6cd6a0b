use crate::config::DEFAULT_POPULAR_COUNT;
use crate::database::EntityStore;
use crate::error::Result;
use crate::likes::LikeLedger;
use crate::model::Film;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RankedFilm {
    pub film: Film,
    pub likes: u64,
}

/// Orders entries by count, highest first, and keeps the first `limit`.
/// Equal counts stay in input order.
pub fn rank<T>(mut entries: Vec<(T, u64)>, limit: usize) -> Vec<(T, u64)> {
    // `sort_by` is stable
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(limit);
    entries
}

/// Popularity ranking over the like ledger.
#[derive(Debug, Clone, Copy)]
pub struct RankingEngine {
    default_count: usize,
}

impl Default for RankingEngine {
    fn default() -> Self {
        RankingEngine::new(DEFAULT_POPULAR_COUNT)
    }
}

impl RankingEngine {
    pub fn new(default_count: usize) -> Self {
        RankingEngine { default_count }
    }

    /// Zero or negative requests fall back to the default size.
    pub fn limit(&self, requested: i64) -> usize {
        if requested <= 0 {
            self.default_count
        } else {
            requested as usize
        }
    }

    /// The `count` most liked films. Ties keep the store's enumeration
    /// order, which is ascending id.
    pub fn popular<S: EntityStore>(
        &self,
        store: &S,
        likes: &LikeLedger<S>,
        count: i64,
    ) -> Result<Vec<RankedFilm>> {
        let entries = store
            .all_films()?
            .into_iter()
            .map(|film| -> Result<(Film, u64)> {
                let count = likes.like_count(film.id)?;
                Ok((film, count))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(rank(entries, self.limit(count))
            .into_iter()
            .map(|(film, likes)| RankedFilm { film, likes })
            .collect())
    }
}
