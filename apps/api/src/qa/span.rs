//! Extractive span decoding.
//!
//! Long contexts are cut into overlapping token windows. Each window is scored
//! by the model; the best `(start, end)` pair over all windows is mapped back to
//! byte offsets and sliced out of the input context, so the answer is always
//! a contiguous substring of it.

use std::ops::Range;

use crate::errors::InferenceError;
use crate::models::resume::InferenceResult;

/// Special tokens around every window: `[CLS] question [SEP] context [SEP]`.
const SPECIAL_TOKENS: usize = 3;

/// A candidate answer, as inclusive token indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredSpan {
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct SpanDecoder {
    pub max_seq_len: usize,
    pub doc_stride: usize,
    pub max_answer_tokens: usize,
}

impl SpanDecoder {
    /// Context-token ranges covered by each model window.
    pub fn windows(
        &self,
        question_tokens: usize,
        context_tokens: usize,
    ) -> Result<Vec<Range<usize>>, InferenceError> {
        let capacity = self
            .max_seq_len
            .saturating_sub(question_tokens + SPECIAL_TOKENS);
        if capacity == 0 {
            return Err(InferenceError::Tokenization(format!(
                "question of {question_tokens} tokens leaves no room for context in {} tokens",
                self.max_seq_len
            )));
        }
        let step = capacity.saturating_sub(self.doc_stride).max(1);

        let mut windows = Vec::new();
        let mut start = 0;
        while start < context_tokens {
            let end = (start + capacity).min(context_tokens);
            windows.push(start..end);
            if end == context_tokens {
                break;
            }
            start += step;
        }
        Ok(windows)
    }

    /// Scores every window with `window_logits` and returns the best answer.
    ///
    /// `offsets[i]` is the byte range of context token `i`. `window_logits`
    /// receives a context-token range and returns start and end logits for
    /// exactly those tokens.
    pub fn decode<F>(
        &self,
        context: &str,
        offsets: &[(usize, usize)],
        question_tokens: usize,
        mut window_logits: F,
    ) -> Result<InferenceResult, InferenceError>
    where
        F: FnMut(Range<usize>) -> Result<(Vec<f32>, Vec<f32>), InferenceError>,
    {
        if offsets.is_empty() {
            return Err(InferenceError::EmptyContext);
        }

        let mut best: Option<ScoredSpan> = None;
        for window in self.windows(question_tokens, offsets.len())? {
            let (start_logits, end_logits) = window_logits(window.clone())?;
            if start_logits.len() != window.len() || end_logits.len() != window.len() {
                return Err(InferenceError::Runtime(format!(
                    "model returned {}/{} logits for a window of {} tokens",
                    start_logits.len(),
                    end_logits.len(),
                    window.len()
                )));
            }

            let candidate = best_span(&start_logits, &end_logits, self.max_answer_tokens).map(
                |s| ScoredSpan {
                    start: s.start + window.start,
                    end: s.end + window.start,
                    score: s.score,
                },
            );
            if let Some(c) = candidate {
                if best.map_or(true, |b| c.score > b.score) {
                    best = Some(c);
                }
            }
        }

        let span = best.ok_or_else(|| InferenceError::Runtime("no answer span found".into()))?;
        slice_answer(context, offsets, span)
    }
}

/// Highest `p_start[s] * p_end[e]` with `s <= e < s + max_answer_tokens`.
pub fn best_span(
    start_logits: &[f32],
    end_logits: &[f32],
    max_answer_tokens: usize,
) -> Option<ScoredSpan> {
    let len = start_logits.len().min(end_logits.len());
    let start_probs = softmax(&start_logits[..len]);
    let end_probs = softmax(&end_logits[..len]);

    let mut best: Option<ScoredSpan> = None;
    for s in 0..len {
        for e in s..(s + max_answer_tokens).min(len) {
            let score = start_probs[s] * end_probs[e];
            if best.map_or(true, |b| score > b.score) {
                best = Some(ScoredSpan { start: s, end: e, score });
            }
        }
    }
    best
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn slice_answer(
    context: &str,
    offsets: &[(usize, usize)],
    span: ScoredSpan,
) -> Result<InferenceResult, InferenceError> {
    let byte_start = offsets[span.start].0;
    let byte_end = offsets[span.end].1;
    let answer = context.get(byte_start..byte_end).ok_or_else(|| {
        InferenceError::Runtime(format!(
            "answer offsets {byte_start}..{byte_end} do not fall on the context text"
        ))
    })?;

    Ok(InferenceResult {
        answer: answer.to_string(),
        score: span.score,
        span: byte_start..byte_end,
    })
}
