//! # Beam Search
//!
//! Backend-agnostic beam search over any step-wise scorer.
//!
//! The search keeps `num_beams` running hypotheses per source sequence. At every
//! step the scorer is asked for next-token log probabilities for all running
//! hypotheses at once, so a backend can evaluate a whole batch of beams in a single
//! decoder pass. Hypotheses that emit the end-of-sequence token move to a bounded
//! pool of finished hypotheses, ranked by `sum_log_probs / gen_len^length_penalty`.
use std::cmp::Ordering;
use crate::error::{Error, Result};
use crate::generation::GenerationConfig;

#[derive(Debug, Clone)]
struct Hypothesis {
    tokens: Vec<u32>,
    log_prob: f32,
}

/// Finished hypotheses for a single source, capped at `num_beams`
#[derive(Debug)]
struct FinishedHypotheses {
    num_beams: usize,
    length_penalty: f32,
    early_stopping: bool,
    hypotheses: Vec<(f32, Vec<u32>)>,
}

impl FinishedHypotheses {
    fn new(num_beams: usize, length_penalty: f32, early_stopping: bool) -> Self {
        Self { num_beams, length_penalty, early_stopping, hypotheses: Vec::with_capacity(num_beams + 1) }
    }

    fn normalize(&self, log_prob: f32, generated: usize) -> f32 {
        log_prob / (generated.max(1) as f32).powf(self.length_penalty)
    }

    fn worst_score(&self) -> f32 {
        self.hypotheses
            .iter()
            .map(|(score, _)| *score)
            .fold(f32::INFINITY, f32::min)
    }

    // `length` counts the decoder start token but not a closing EOS
    fn add(&mut self, tokens: Vec<u32>, log_prob: f32, length: usize) {
        let score = self.normalize(log_prob, length);
        if self.hypotheses.len() < self.num_beams || score > self.worst_score() {
            self.hypotheses.push((score, tokens));
            if self.hypotheses.len() > self.num_beams {
                let worst = self
                    .hypotheses
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.0.total_cmp(&b.1.0))
                    .map(|(idx, _)| idx);
                if let Some(idx) = worst {
                    self.hypotheses.remove(idx);
                }
            }
        }
    }

    /// Whether no running hypothesis can still improve this pool
    fn is_done(&self, best_running_log_prob: Option<f32>, generated: usize) -> bool {
        if self.hypotheses.len() < self.num_beams {
            return false;
        }
        if self.early_stopping {
            return true;
        }
        match best_running_log_prob {
            None => true,
            Some(log_prob) => self.worst_score() >= self.normalize(log_prob, generated),
        }
    }

    fn best(&self) -> Option<&[u32]> {
        self.hypotheses
            .iter()
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, tokens)| tokens.as_slice())
    }
}

/// Beam search parameters, taken from a [`GenerationConfig`] plus the model's
/// end-of-sequence token.
#[derive(Debug, Clone)]
pub struct BeamSearch {
    num_beams: usize,
    max_new_tokens: usize,
    min_new_tokens: usize,
    early_stopping: bool,
    length_penalty: f32,
    decoder_start_token_id: u32,
    eos_token_id: u32,
}

impl BeamSearch {
    pub fn new(config: &GenerationConfig, eos_token_id: u32) -> Self {
        Self {
            num_beams: config.num_beams(),
            max_new_tokens: config.max_new_tokens(),
            min_new_tokens: config.min_new_tokens(),
            early_stopping: config.early_stopping(),
            length_penalty: config.length_penalty(),
            decoder_start_token_id: config.decoder_start_token_id(),
            eos_token_id,
        }
    }

    /// Run beam search for `batch_size` independent sources.
    ///
    /// `score(sources, prefixes)` must return one row of next-token log probabilities
    /// per prefix; `sources[i]` is the source index `prefixes[i]` belongs to. All
    /// prefixes passed in a single call have the same length.
    ///
    /// Returns the best hypothesis per source, starting with the decoder start token
    /// and ending with the end-of-sequence token when one was produced.
    pub fn run<F>(&self, batch_size: usize, mut score: F) -> Result<Vec<Vec<u32>>>
    where F: FnMut(&[usize], &[Vec<u32>]) -> Result<Vec<Vec<f32>>>
    {
        let mut running: Vec<Vec<Hypothesis>> = (0..batch_size)
            .map(|_| vec![Hypothesis { tokens: vec![self.decoder_start_token_id], log_prob: 0.0 }])
            .collect();
        let mut finished: Vec<FinishedHypotheses> = (0..batch_size)
            .map(|_| FinishedHypotheses::new(self.num_beams, self.length_penalty, self.early_stopping))
            .collect();
        let mut done = vec![false; batch_size];

        for step in 0..self.max_new_tokens {
            let mut sources = Vec::new();
            let mut prefixes = Vec::new();
            for (source, beams) in running.iter().enumerate() {
                if done[source] {
                    continue;
                }
                for beam in beams {
                    sources.push(source);
                    prefixes.push(beam.tokens.clone());
                }
            }
            if prefixes.is_empty() {
                break;
            }

            let log_probs = score(&sources, &prefixes)?;
            if log_probs.len() != prefixes.len() {
                return Err(Error::Generation(format!(
                    "scorer returned {} rows for {} hypotheses",
                    log_probs.len(),
                    prefixes.len()
                )));
            }

            let mut offset = 0;
            for source in 0..batch_size {
                if done[source] {
                    continue;
                }
                let beams = &running[source];
                let rows = &log_probs[offset..offset + beams.len()];
                offset += beams.len();

                let candidates = self.top_candidates(beams, rows, step);
                let mut next = Vec::with_capacity(self.num_beams);
                for (rank, (log_prob, beam, token)) in candidates.into_iter().enumerate() {
                    let mut tokens = beams[beam].tokens.clone();
                    tokens.push(token);
                    if token == self.eos_token_id {
                        if rank < self.num_beams {
                            let length = tokens.len() - 1;
                            finished[source].add(tokens, log_prob, length);
                        }
                    } else {
                        next.push(Hypothesis { tokens, log_prob });
                    }
                    if next.len() == self.num_beams {
                        break;
                    }
                }

                let best_running = next.first().map(|h| h.log_prob);
                if next.is_empty() || finished[source].is_done(best_running, step + 1) {
                    done[source] = true;
                }
                running[source] = next;
            }

            if done.iter().all(|&d| d) {
                break;
            }
        }

        let mut outputs = Vec::with_capacity(batch_size);
        for source in 0..batch_size {
            if !done[source] {
                for hypothesis in running[source].drain(..) {
                    let length = hypothesis.tokens.len();
                    finished[source].add(hypothesis.tokens, hypothesis.log_prob, length);
                }
            }
            let best = finished[source]
                .best()
                .map(<[u32]>::to_vec)
                .unwrap_or_else(|| vec![self.decoder_start_token_id]);
            outputs.push(best);
        }
        Ok(outputs)
    }

    /// The `2 * num_beams` best `(log_prob, beam, token)` extensions, best first.
    fn top_candidates(&self, beams: &[Hypothesis], rows: &[Vec<f32>], step: usize) -> Vec<(f32, usize, u32)> {
        let mask_eos = step < self.min_new_tokens;
        let mut candidates = Vec::new();
        for (beam, row) in rows.iter().enumerate() {
            for (token, &log_prob) in row.iter().enumerate() {
                let token = token as u32;
                if (mask_eos && token == self.eos_token_id) || !log_prob.is_finite() {
                    continue;
                }
                candidates.push((beams[beam].log_prob + log_prob, beam, token));
            }
        }

        let order = |a: &(f32, usize, u32), b: &(f32, usize, u32)| -> Ordering {
            b.0.total_cmp(&a.0)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
        };
        let keep = 2 * self.num_beams;
        if candidates.len() > keep {
            candidates.select_nth_unstable_by(keep - 1, order);
            candidates.truncate(keep);
        }
        candidates.sort_by(order);
        candidates
    }
}
