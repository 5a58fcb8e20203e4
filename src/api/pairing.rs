use crate::api::{ApiResult, ProgressCallback, ProgressEvent};
use crate::config::Config;
use crate::genetics::inbreeding::{DEFAULT_GENERATIONS, MAX_GENERATIONS};
use crate::genetics::{
    self, extract, ranker, CandidateDog, DogGenotype, Gender, InbreedingEstimator,
    PairingAnalysis, PartnerSuggestion, ScoringMode,
};
use crate::store::{GeneticDataStore, PedigreeStore};
use crossbeam_channel::{bounded, unbounded};
use std::thread;
use tracing::{debug, info, warn};

const RANKING_TASK: &str = "Partner ranking";

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub scoring_mode: ScoringMode,
    pub pedigree_generations: u32,
    pub workers: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            scoring_mode: ScoringMode::default(),
            pedigree_generations: DEFAULT_GENERATIONS,
            workers: 4,
        }
    }
}

impl From<&Config> for AnalysisOptions {
    fn from(config: &Config) -> Self {
        Self {
            scoring_mode: config.scoring_mode,
            pedigree_generations: config.pedigree_generations.min(MAX_GENERATIONS),
            workers: config.ranker_workers,
        }
    }
}

/// Pulls records from the collaborator stores and runs the pairing pipeline.
///
/// The analyzer holds no state between calls; every analysis works on freshly
/// fetched records.
pub struct PairingAnalyzer<'a> {
    genetics: &'a dyn GeneticDataStore,
    pedigree: &'a dyn PedigreeStore,
    options: AnalysisOptions,
    progress_callback: Option<ProgressCallback>,
}

impl<'a> PairingAnalyzer<'a> {
    pub fn new(genetics: &'a dyn GeneticDataStore, pedigree: &'a dyn PedigreeStore) -> Self {
        Self {
            genetics,
            pedigree,
            options: AnalysisOptions::default(),
            progress_callback: None,
        }
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// `Ok(None)` when the dog has no genetic record.
    pub fn load_genotype(&self, dog_id: &str) -> ApiResult<Option<DogGenotype>> {
        let record = self.genetics.fetch_raw_genetic_record(dog_id)?;
        Ok(extract(record.as_ref()))
    }

    pub fn analyze(&self, sire_id: &str, dam_id: &str) -> ApiResult<PairingAnalysis> {
        let sire = self.load_genotype(sire_id)?;
        let dam = self.load_genotype(dam_id)?;
        let inbreeding = self.estimator().estimate(sire_id, dam_id)?;

        let analysis = genetics::analyze_pairing(
            sire_id,
            dam_id,
            sire,
            dam,
            inbreeding,
            self.options.scoring_mode,
        );
        info!(
            sire = sire_id,
            dam = dam_id,
            score = analysis.compatibility_score,
            "Pairing analysis complete"
        );
        Ok(analysis)
    }

    /// Ranks opposite-gender candidates as mates for `dog_id`.
    ///
    /// Candidates are analyzed on a fixed pool of worker threads. A candidate
    /// without a genetic record, or whose analysis fails, is left out of the
    /// result instead of failing the batch.
    pub fn rank_partners(
        &self,
        dog_id: &str,
        gender: Gender,
        candidates: &[CandidateDog],
        limit: usize,
    ) -> ApiResult<Vec<PartnerSuggestion>> {
        let Some(focal) = self.load_genotype(dog_id)? else {
            info!(dog = dog_id, "No genetic record for focal dog, nothing to rank");
            return Ok(Vec::new());
        };

        let eligible: Vec<&CandidateDog> = candidates
            .iter()
            .filter(|c| ranker::is_eligible(dog_id, gender, c))
            .collect();
        let total = eligible.len() as u64;

        self.emit_progress(ProgressEvent::Started {
            task: RANKING_TASK.to_string(),
            total,
        });

        let num_workers = self.options.workers.clamp(1, eligible.len().max(1));
        let focal = &focal;

        let suggestions = thread::scope(|scope| {
            let (job_tx, job_rx) = bounded::<&CandidateDog>(num_workers * 2);
            let (result_tx, result_rx) = unbounded();

            let handles: Vec<_> = (0..num_workers)
                .map(|_| {
                    let job_rx = job_rx.clone();
                    let result_tx = result_tx.clone();
                    scope.spawn(move || {
                        while let Ok(candidate) = job_rx.recv() {
                            let outcome = self.evaluate_candidate(dog_id, gender, focal, candidate);
                            if result_tx.send((candidate.dog_id.as_str(), outcome)).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();
            drop(job_rx);
            drop(result_tx);

            for candidate in &eligible {
                if job_tx.send(*candidate).is_err() {
                    break;
                }
            }
            drop(job_tx);

            let mut suggestions = Vec::with_capacity(eligible.len());
            let mut current = 0;
            for (candidate_id, outcome) in result_rx.iter() {
                current += 1;
                match outcome {
                    Ok(Some(suggestion)) => suggestions.push(suggestion),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(candidate = candidate_id, error = %e, "Excluding candidate from ranking");
                        self.emit_progress(ProgressEvent::Error {
                            task: RANKING_TASK.to_string(),
                            error: format!("{}: {}", candidate_id, e),
                        });
                    }
                }
                self.emit_progress(ProgressEvent::Progress {
                    task: RANKING_TASK.to_string(),
                    current,
                    total,
                });
            }

            for handle in handles {
                if handle.join().is_err() {
                    warn!("Ranking worker panicked; the candidate it was analyzing was dropped");
                }
            }

            suggestions
        });

        self.emit_progress(ProgressEvent::Completed {
            task: RANKING_TASK.to_string(),
        });

        let ranked = ranker::rank(suggestions, limit);
        info!(dog = dog_id, returned = ranked.len(), "Partner ranking complete");
        Ok(ranked)
    }

    fn evaluate_candidate(
        &self,
        dog_id: &str,
        gender: Gender,
        focal: &DogGenotype,
        candidate: &CandidateDog,
    ) -> ApiResult<Option<PartnerSuggestion>> {
        let Some(candidate_genotype) = self.load_genotype(&candidate.dog_id)? else {
            debug!(candidate = %candidate.dog_id, "Skipping candidate without genetic record");
            return Ok(None);
        };

        let (sire_id, dam_id) = ranker::assign_roles(dog_id, gender, &candidate.dog_id);
        let (sire, dam) = match gender {
            Gender::Male => (focal.clone(), candidate_genotype),
            Gender::Female => (candidate_genotype, focal.clone()),
        };

        let inbreeding = self.estimator().estimate(sire_id, dam_id)?;
        let analysis = genetics::analyze_pairing(
            sire_id,
            dam_id,
            Some(sire),
            Some(dam),
            inbreeding,
            self.options.scoring_mode,
        );

        let name = self
            .genetics
            .fetch_dog_label(&candidate.dog_id)?
            .map(|label| label.name)
            .unwrap_or_else(|| candidate.dog_id.clone());

        Ok(Some(ranker::suggestion(candidate, name, &analysis)))
    }

    fn estimator(&self) -> InbreedingEstimator<'a> {
        InbreedingEstimator::new(self.pedigree).with_generations(self.options.pedigree_generations)
    }

    fn emit_progress(&self, event: ProgressEvent) {
        if let Some(callback) = &self.progress_callback {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonKennelStore;
    use std::sync::{Arc, Mutex};

    const KENNEL: &str = r#"{
        "dogs": [
            { "id": "rex", "name": "Rex", "gender": "male",
              "genetics": { "healthResults": { "PRA": "carrier" } } },
            { "id": "luna", "name": "Luna", "gender": "female",
              "genetics": { "healthResults": { "PRA": "clear" } } },
            { "id": "nova", "name": "Nova", "gender": "female",
              "genetics": { "healthResults": { "PRA": "carrier" } } },
            { "id": "ghost", "name": "Ghost", "gender": "female" },
            { "id": "duke", "name": "Duke", "gender": "male",
              "genetics": { "healthResults": { "PRA": "clear" } } }
        ]
    }"#;

    #[test]
    fn test_analyze_reads_both_parents() {
        let store = JsonKennelStore::from_json(KENNEL).unwrap();
        let analyzer = PairingAnalyzer::new(&store, &store);

        let analysis = analyzer.analyze("rex", "nova").unwrap();
        assert_eq!(analysis.sire_id, "rex");
        assert_eq!(analysis.health_risks["PRA"].probability, 0.25);
        assert_eq!(analysis.inbreeding_coefficient, None);
    }

    #[test]
    fn test_rank_partners_filters_and_orders() {
        let store = JsonKennelStore::from_json(KENNEL).unwrap();
        let analyzer = PairingAnalyzer::new(&store, &store);

        let ranked = analyzer
            .rank_partners("rex", Gender::Male, &store.candidates(), 5)
            .unwrap();
        let ids: Vec<_> = ranked.iter().map(|s| s.dog_id.as_str()).collect();
        assert_eq!(ids, vec!["luna", "nova"]);
        assert_eq!(ranked[0].name, "Luna");
        assert_eq!(ranked[1].major_health_issues, 1);
    }

    #[test]
    fn test_rank_partners_without_focal_record() {
        let store = JsonKennelStore::from_json(KENNEL).unwrap();
        let analyzer = PairingAnalyzer::new(&store, &store);

        let ranked = analyzer
            .rank_partners("ghost", Gender::Female, &store.candidates(), 5)
            .unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_progress_events() {
        let store = JsonKennelStore::from_json(KENNEL).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let analyzer = PairingAnalyzer::new(&store, &store).with_progress(Arc::new(move |event| {
            sink.lock().unwrap().push(event);
        }));

        analyzer
            .rank_partners("rex", Gender::Male, &store.candidates(), 5)
            .unwrap();

        let events = events.lock().unwrap();
        assert!(matches!(events.first(), Some(ProgressEvent::Started { total: 3, .. })));
        assert!(matches!(events.last(), Some(ProgressEvent::Completed { .. })));
        let progress = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Progress { .. }))
            .count();
        assert_eq!(progress, 3);
    }

    #[test]
    fn test_options_from_config() {
        let config = Config {
            ranker_workers: 2,
            scoring_mode: ScoringMode::Warnings,
            ..Config::default()
        };
        let options = AnalysisOptions::from(&config);
        assert_eq!(options.workers, 2);
        assert_eq!(options.scoring_mode, ScoringMode::Warnings);
        assert_eq!(options.pedigree_generations, DEFAULT_GENERATIONS);

        let deep = Config {
            pedigree_generations: 30,
            ..Config::default()
        };
        assert_eq!(AnalysisOptions::from(&deep).pedigree_generations, MAX_GENERATIONS);
    }
}
