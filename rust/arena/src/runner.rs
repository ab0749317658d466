use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use duelbench_engine::deck::{secure_base_seed, SeedStream};
use duelbench_engine::logger::{ActionLogRow, HandLogger};
use duelbench_engine::player::Seat;
use duelbench_judge::{accuracy_by_actor, judge_rows, Accuracy};
use duelbench_rating::glicko2::score_from_margin;
use duelbench_rating::stats::{bootstrap_ci95, ContestantStats, PairRecord};
use duelbench_rating::{Elo, Glicko2};

use crate::config::ArenaConfig;
use crate::duel::{Contestant, Duel, PairSummary};
use crate::report::{ContestantReport, MatchEnd, MatchReport, MatrixReport, Standing};
use crate::stop::{StopMode, StopToken};
use crate::store::{Career, MatchInfo, MatchStore, ParticipantRow, RatingSnapshot, Recorder, SnapshotPhase};
use crate::ArenaError;

const PROBE_SALT: u64 = 0x5052_4F42_4553_4545;
const LABELS: [&str; 2] = ["A", "B"];

/// Running totals for one match.
struct Ledger {
    banks: [i64; 2],
    wins: [u32; 2],
    stats: [ContestantStats; 2],
    pairs: PairRecord,
    margins_bb: Vec<f64>,
    pairs_played: u32,
    hands_played: u32,
}

impl Ledger {
    fn new(starting_stack: u32) -> Self {
        Self {
            banks: [i64::from(starting_stack); 2],
            wins: [0; 2],
            stats: [ContestantStats::default(); 2],
            pairs: PairRecord::default(),
            margins_bb: Vec::new(),
            pairs_played: 0,
            hands_played: 0,
        }
    }

    fn record(&mut self, pair: &PairSummary, bb: u32) {
        for hand in &pair.hands {
            let a = hand.delta_a();
            let deltas = [a, -a];
            let seats = [hand.a_seat, hand.a_seat.other()];
            for i in 0..2 {
                self.banks[i] += deltas[i];
                self.stats[i].record(seats[i] == Seat::SmallBlind, deltas[i]);
                if hand.outcome.winner == Some(seats[i]) {
                    self.wins[i] += 1;
                }
            }
            self.hands_played += 1;
        }
        let chips = pair.chips_a();
        self.pairs.record(chips);
        self.margins_bb.push(chips as f64 / f64::from(bb.max(1)));
        self.pairs_played += 1;
    }

    fn busted(&self, contestants: [&Contestant; 2]) -> Option<String> {
        (0..2)
            .find(|&i| self.banks[i] <= 0)
            .map(|i| contestants[i].name.clone())
    }
}

/// Plays one match of `config.pairs` mirrored pairs and rates it.
///
/// Careers are read from and written back to `store`. Store failures never
/// end the match; they set [`MatchReport::persistence_degraded`].
///
/// # Errors
///
/// Only [`ArenaError::Config`] for an invalid configuration. Engine
/// invariant breaches end the match as [`MatchEnd::EngineFault`].
pub async fn run_match(
    config: &ArenaConfig,
    a: &Contestant,
    b: &Contestant,
    store: &mut dyn MatchStore,
    stop: StopToken,
    history: Option<&mut HandLogger>,
) -> Result<MatchReport, ArenaError> {
    config.validate()?;
    if a.name == b.name {
        return Err(ArenaError::Config(format!(
            "contestants need distinct names, both are {:?}",
            a.name
        )));
    }
    let contestants = [a, b];
    let base_seed = config.seed.unwrap_or_else(secure_base_seed);
    let match_id = uuid::Uuid::new_v4().to_string();
    let bb = config.big_blind;

    let mut duel = Duel::new(
        match_id.clone(),
        config,
        contestants,
        stop,
        Recorder::new(store),
        base_seed ^ PROBE_SALT,
    )
    .with_history(history);

    duel.recorder().begin_match(&MatchInfo {
        match_id: match_id.clone(),
        contestants: [a.name.clone(), b.name.clone()],
        base_seed,
        pairs: config.pairs,
        started_at: chrono::Utc::now().to_rfc3339(),
    });

    let mut careers = contestants.map(|c| {
        duel.recorder()
            .career(&c.name)
            .unwrap_or_else(|| Career::new(c.name.clone(), config.elo.start))
    });
    let prior_accuracy = contestants.map(|c| duel.recorder().judge_accuracy(&c.name).and_then(|acc| acc.rate()));
    let mut elo = Elo::new(config.elo);
    elo.set_accuracy(prior_accuracy[0].unwrap_or(0.5), prior_accuracy[1].unwrap_or(0.5));
    let mut glicko = [careers[0].glicko, careers[1].glicko];

    tracing::info!(%match_id, a = %a.name, b = %b.name, base_seed, pairs = config.pairs, "match started");
    duel.recorder().rating_snapshot(&RatingSnapshot {
        match_id: match_id.clone(),
        phase: SnapshotPhase::Start,
        elo: [elo.a, elo.b],
        glicko,
    });

    let mut ledger = Ledger::new(config.starting_stack);
    let mut seeds = SeedStream::new(base_seed);
    let mut end = MatchEnd::Completed;

    for index in 0..config.pairs {
        if let Some(mode) = duel.stop().poll() {
            end = match mode {
                StopMode::Graceful => MatchEnd::StoppedGracefully,
                StopMode::Immediate => MatchEnd::Aborted,
            };
            break;
        }
        let seed = seeds.next_seed();
        let pair = match duel.play_pair(index, seed).await {
            Ok(Some(pair)) => pair,
            Ok(None) => {
                end = MatchEnd::Aborted;
                break;
            }
            Err(ArenaError::Engine(err)) => {
                tracing::error!(%match_id, pair = index, %err, "engine invariant violated, ending match");
                end = MatchEnd::EngineFault {
                    detail: err.to_string(),
                };
                break;
            }
            Err(err) => return Err(err),
        };

        ledger.record(&pair, bb);
        if config.elo.per_hand {
            for hand in &pair.hands {
                let score = match hand.delta_a().signum() {
                    1 => 1.0,
                    -1 => 0.0,
                    _ => 0.5,
                };
                elo.update_hand(score, hand.outcome.pot, bb)?;
            }
        } else {
            elo.update_pair(pair.chips_a(), pair.pot_sum(), bb);
        }
        let score = score_from_margin(pair.chips_a(), f64::from(config.starting_stack));
        let [ga, gb] = &mut glicko;
        if let Err(err) = Glicko2::update_pair(ga, gb, score, config.glicko_tau) {
            tracing::error!(%match_id, pair = index, %err, "glicko update failed, ratings unchanged for this pair");
        }

        duel.recorder().rating_snapshot(&RatingSnapshot {
            match_id: match_id.clone(),
            phase: SnapshotPhase::AfterPair(index),
            elo: [elo.a, elo.b],
            glicko,
        });
        tracing::info!(
            %match_id,
            pair = index,
            chips_a = pair.chips_a(),
            bank_a = ledger.banks[0],
            bank_b = ledger.banks[1],
            elo_a = elo.a,
            elo_b = elo.b,
            "pair finished"
        );

        if let Some(contestant) = ledger.busted(contestants) {
            tracing::info!(%match_id, %contestant, "bank reached zero, ending match");
            end = MatchEnd::BankBusted { contestant };
            break;
        }
    }

    let mut accuracy = [Accuracy::default(); 2];
    let mut verdict_count = 0;
    if end.is_result() {
        let rows: Vec<ActionLogRow> = match duel.recorder().action_rows(&match_id) {
            Some(rows) => rows,
            None => duel.rows().to_vec(),
        };
        let verdicts = judge_rows(&rows, bb, &config.judge);
        for v in &verdicts {
            duel.recorder().upsert_verdict(v);
        }
        verdict_count = verdicts.len();
        let by_actor = accuracy_by_actor(&verdicts);
        accuracy = contestants.map(|c| by_actor.get(&c.name).copied().unwrap_or_default());

        duel.recorder().rating_snapshot(&RatingSnapshot {
            match_id: match_id.clone(),
            phase: SnapshotPhase::End,
            elo: [elo.a, elo.b],
            glicko,
        });
        let tallies = duel.tallies();
        for i in 0..2 {
            duel.recorder().record_participant(&ParticipantRow {
                match_id: match_id.clone(),
                name: contestants[i].name.clone(),
                label: LABELS[i].to_string(),
                start_bank: config.starting_stack,
                end_bank: ledger.banks[i],
                wins: ledger.wins[i],
                stats: ledger.stats[i],
                tally: tallies[i],
            });
            let career = &mut careers[i];
            career.elo = if i == 0 { elo.a } else { elo.b };
            career.glicko = glicko[i];
            career.matches += 1;
            career.hands += ledger.hands_played;
            duel.recorder().save_career(career);
        }
    }
    duel.recorder().complete_match(&match_id, &end);
    tracing::info!(%match_id, %end, pairs = ledger.pairs_played, verdicts = verdict_count, "match finished");

    let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
    let margin_ci95_bb = bootstrap_ci95(&ledger.margins_bb, config.bootstrap_resamples, &mut rng);
    let tallies = duel.tallies();
    let fallbacks = duel.fallbacks();
    let persistence_degraded = duel.recorder().is_degraded();
    let elos = [elo.a, elo.b];
    let reports = [0, 1].map(|i| ContestantReport {
        name: contestants[i].name.clone(),
        bank: ledger.banks[i],
        wins: ledger.wins[i],
        stats: ledger.stats[i],
        tally: tallies[i],
        fallbacks: fallbacks[i],
        elo: elos[i],
        glicko: glicko[i],
        accuracy: accuracy[i],
    });

    Ok(MatchReport {
        match_id,
        base_seed,
        end,
        pairs_played: ledger.pairs_played,
        hands_played: ledger.hands_played,
        contestants: reports,
        pair_win_ci95: ledger.pairs.wilson_ci95(),
        pairs: ledger.pairs,
        margin_ci95_bb,
        verdicts: verdict_count,
        persistence_degraded,
    })
}

/// Round robin: every contestant meets every other once, one match at a
/// time. Glicko ratings carry over through the store's careers. Stops early
/// when a match does not end with a result.
pub async fn run_matrix(
    config: &ArenaConfig,
    contestants: &[Contestant],
    store: &mut dyn MatchStore,
    stop: StopToken,
) -> Result<MatrixReport, ArenaError> {
    if contestants.len() < 2 {
        return Err(ArenaError::Config("a matrix needs at least two contestants".into()));
    }
    let mut seeds = config.seed.map(SeedStream::new);
    let mut matches = Vec::new();
    let mut interrupted = false;

    'outer: for i in 0..contestants.len() {
        for j in i + 1..contestants.len() {
            if stop.poll().is_some() {
                interrupted = true;
                break 'outer;
            }
            let match_config = ArenaConfig {
                seed: seeds.as_mut().map(SeedStream::next_seed),
                ..config.clone()
            };
            let report = run_match(
                &match_config,
                &contestants[i],
                &contestants[j],
                &mut *store,
                stop.clone(),
                None,
            )
            .await?;
            let finished = report.end.is_result() && report.end != MatchEnd::StoppedGracefully;
            matches.push(report);
            if !finished {
                interrupted = true;
                break 'outer;
            }
        }
    }

    let mut standings: Vec<Standing> = contestants
        .iter()
        .map(|c| {
            let rows: Vec<&ContestantReport> = matches
                .iter()
                .flat_map(|m| m.contestants.iter())
                .filter(|r| r.name == c.name)
                .collect();
            Standing {
                name: c.name.clone(),
                glicko: rows.last().map(|r| r.glicko).unwrap_or_default(),
                matches: rows.len() as u32,
                net_chips: rows.iter().map(|r| r.stats.overall.net_chips).sum(),
            }
        })
        .collect();
    standings.sort_by(|x, y| y.glicko.rating.total_cmp(&x.glicko.rating));

    Ok(MatrixReport {
        matches,
        standings,
        interrupted,
    })
}
